//! Unit and behavioural tests for working directory resolution.


use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use tbk_config::{DirectoriesSpec, Parallelism, WorkingLocation, WorkingSpec};
use tempfile::TempDir;

use crate::{WorkingDirError, list_dirs, partition, resolve};

/// Parent directory holding `blue`, `green`, `red` and a `notes.txt` file.
#[fixture]
fn colours() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for name in ["blue", "green", "red"] {
        std::fs::create_dir(dir.path().join(name)).expect("create dir");
    }
    std::fs::write(dir.path().join("notes.txt"), "not a module").expect("write file");
    dir
}

fn utf8(dir: &TempDir) -> &Utf8Path {
    Utf8Path::from_path(dir.path()).expect("utf-8 temp path")
}

fn parent_spec(dir: &TempDir, regex: &str, parallelism: Option<Parallelism>) -> WorkingSpec {
    WorkingSpec {
        location: WorkingLocation::Directories(DirectoriesSpec::ParentDirectory {
            path: utf8(dir).to_path_buf(),
            name_regex: Some(regex.to_owned()),
        }),
        parallelism,
    }
}

#[rstest]
#[case::empty(0, 3)]
#[case::fewer_items_than_jobs(2, 5)]
#[case::even(9, 3)]
#[case::uneven(10, 3)]
#[case::single_job(7, 1)]
#[case::many(101, 8)]
fn shards_reassemble_the_input(#[case] len: usize, #[case] count: usize) {
    let items: Vec<usize> = (0..len).collect();
    let shards: Vec<&[usize]> = (0..count).map(|job| partition(&items, job, count)).collect();

    let rejoined: Vec<usize> = shards.iter().flat_map(|shard| shard.iter().copied()).collect();
    assert_eq!(rejoined, items);

    let sizes: Vec<usize> = shards.iter().map(|shard| shard.len()).collect();
    let max = sizes.iter().max().copied().unwrap_or_default();
    let min = sizes.iter().min().copied().unwrap_or_default();
    assert!(max - min <= 1, "unbalanced shards {sizes:?}");
}

#[rstest]
#[case::zero_count(0, 0)]
#[case::job_equals_count(3, 3)]
#[case::job_beyond_count(7, 3)]
fn degenerate_assignments_yield_nothing(#[case] job: usize, #[case] count: usize) {
    assert!(partition(&[1, 2, 3, 4], job, count).is_empty());
}

#[test]
fn extra_items_go_to_the_first_jobs() {
    let items = [1, 2, 3, 4, 5, 6, 7];
    assert_eq!(partition(&items, 0, 3), [1, 2, 3]);
    assert_eq!(partition(&items, 1, 3), [4, 5]);
    assert_eq!(partition(&items, 2, 3), [6, 7]);
}

#[rstest]
fn listing_filters_by_base_name_and_skips_files(colours: TempDir) {
    let dirs = list_dirs(utf8(&colours), Some("^(blue|green)$")).expect("list dirs");
    let parent = utf8(&colours);
    assert_eq!(dirs, [parent.join("blue"), parent.join("green")]);
}

#[rstest]
fn listing_without_regex_keeps_every_directory_sorted(colours: TempDir) {
    let names: Vec<String> = list_dirs(utf8(&colours), None)
        .expect("list dirs")
        .iter()
        .filter_map(|dir| dir.file_name().map(str::to_owned))
        .collect();
    assert_eq!(names, ["blue", "green", "red"]);
}

#[rstest]
fn regex_matches_name_not_full_path(colours: TempDir) {
    let parent = utf8(&colours);
    let anchored = format!("^{}", regex::escape(parent.as_str()));
    assert!(list_dirs(parent, Some(&anchored)).expect("list dirs").is_empty());
}

#[cfg(target_os = "linux")]
#[rstest]
fn non_utf8_entries_do_not_break_the_listing(colours: TempDir) {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let stray = colours.path().join(OsStr::from_bytes(b"stray-\xff.txt"));
    std::fs::write(stray, "stray").expect("write non-utf-8 file");
    let odd_dir = colours.path().join(OsStr::from_bytes(b"odd-\xfe"));
    std::fs::create_dir(odd_dir).expect("create non-utf-8 dir");

    let parent = utf8(&colours);
    let dirs = list_dirs(parent, Some("^(blue|green)$")).expect("list dirs");
    assert_eq!(dirs, [parent.join("blue"), parent.join("green")]);

    let all = list_dirs(parent, None).expect("list dirs");
    assert_eq!(all, [parent.join("blue"), parent.join("green"), parent.join("red")]);
}

#[rstest]
fn invalid_regex_is_reported(colours: TempDir) {
    let err = list_dirs(utf8(&colours), Some("(")).expect_err("regex must fail");
    assert!(matches!(err, WorkingDirError::InvalidRegex { .. }));
}

#[test]
fn missing_parent_is_a_read_error() {
    let err = list_dirs(Utf8Path::new("/no/such/parent"), None).expect_err("listing must fail");
    assert!(matches!(err, WorkingDirError::ReadDir { .. }));
}

#[test]
fn absent_spec_resolves_to_nothing() {
    assert!(resolve(None).expect("resolve").is_empty());
}

#[test]
fn single_directory_resolves_to_itself() {
    let spec = WorkingSpec {
        location: WorkingLocation::Directory(Utf8PathBuf::from("/work/app")),
        parallelism: None,
    };
    assert_eq!(
        resolve(Some(&spec)).expect("resolve"),
        [Utf8PathBuf::from("/work/app")]
    );
}

#[test]
fn artifact_discovery_is_not_implemented() {
    let spec = WorkingSpec {
        location: WorkingLocation::Directories(DirectoriesSpec::Artifact {
            path: Utf8PathBuf::from("dirs.tar.gz"),
            name_regex: None,
        }),
        parallelism: None,
    };
    let err = resolve(Some(&spec)).expect_err("artifact must fail");
    assert!(matches!(err, WorkingDirError::NotImplemented { .. }));
}

#[rstest]
fn each_shard_gets_one_of_three(colours: TempDir) {
    let mut seen: Vec<Utf8PathBuf> = Vec::new();
    for job in 0..3 {
        let spec = parent_spec(
            &colours,
            ".*",
            Some(Parallelism {
                parallel_job: job,
                parallel_job_count: 3,
            }),
        );
        let shard = resolve(Some(&spec)).expect("resolve");
        assert_eq!(shard.len(), 1, "job {job} got {shard:?}");
        seen.extend(shard);
    }
    let parent = utf8(&colours);
    assert_eq!(
        seen,
        [parent.join("blue"), parent.join("green"), parent.join("red")]
    );
}
