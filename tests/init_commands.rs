use predicates::prelude::predicate;

mod common;

#[test]
fn init_repository_successfully() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;

    let mut sut = common::wit_command(dir.path(), &["init"]);

    sut.assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^Initialized empty repository in .+$",
        )?);

    let git_path = dir.path().join(".git");
    for subdir in ["branches", "objects", "refs/tags", "refs/heads"] {
        assert!(git_path.join(subdir).is_dir(), "missing {subdir}");
    }

    let head = std::fs::read_to_string(git_path.join("HEAD"))?;
    assert_eq!(head, "ref: refs/heads/master");

    let config = std::fs::read_to_string(git_path.join("config"))?;
    assert!(config.contains("repositoryformatversion = 0"));
    assert!(config.contains("filemode = false"));
    assert!(config.contains("bare = false"));

    assert!(git_path.join("description").is_file());

    Ok(())
}

#[test]
fn init_with_explicit_path_creates_missing_directories() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let target = dir.path().join("nested").join("project");

    let mut sut = common::wit_command(dir.path(), &["init", target.to_str().unwrap()]);

    sut.assert().success();
    assert!(target.join(".git").join("objects").is_dir());

    Ok(())
}

#[test]
fn init_on_non_empty_directory_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    std::fs::write(dir.path().join("precious.txt"), b"user data")?;

    let mut sut = common::wit_command(dir.path(), &["init"]);

    sut.assert()
        .failure()
        .stderr(predicate::str::contains("is not empty"));

    assert!(!dir.path().join(".git").exists());

    Ok(())
}
