use assert_fs::fixture::{FileWriteStr, PathChild};
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};
use predicates::prelude::predicate;

mod common;

fn init_repository(dir: &assert_fs::TempDir) {
    common::wit_command(dir.path(), &["init"]).assert().success();
}

fn create_random_file(dir: &assert_fs::TempDir) -> (String, String) {
    let file_name = format!("{}.txt", Word().fake::<String>());
    let file_content = Words(5..10).fake::<Vec<String>>().join(" ");
    dir.child(&file_name).write_str(&file_content).unwrap();
    (file_name, file_content)
}

#[test]
fn write_blob_object_successfully() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    init_repository(&dir);
    let (file_name, _) = create_random_file(&dir);

    let mut sut = common::wit_command(dir.path(), &["hash-object", "-w", &file_name]);

    let oid = common::stdout_oid(&mut sut);
    assert_eq!(oid.len(), 40);
    assert!(oid.chars().all(|c| c.is_ascii_hexdigit()));

    let object_path = dir
        .path()
        .join(".git")
        .join("objects")
        .join(&oid[..2])
        .join(&oid[2..]);
    assert!(object_path.is_file());

    Ok(())
}

#[test]
fn hash_object_without_write_does_not_store() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    init_repository(&dir);
    let (file_name, _) = create_random_file(&dir);

    let mut sut = common::wit_command(dir.path(), &["hash-object", &file_name]);

    let oid = common::stdout_oid(&mut sut);
    let object_path = dir
        .path()
        .join(".git")
        .join("objects")
        .join(&oid[..2])
        .join(&oid[2..]);
    assert!(!object_path.exists());

    Ok(())
}

#[test]
fn hashing_the_same_file_twice_reports_the_same_id() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    init_repository(&dir);
    let (file_name, _) = create_random_file(&dir);

    let first = common::stdout_oid(&mut common::wit_command(
        dir.path(),
        &["hash-object", "-w", &file_name],
    ));
    let second = common::stdout_oid(&mut common::wit_command(
        dir.path(),
        &["hash-object", "-w", &file_name],
    ));

    assert_eq!(first, second);

    Ok(())
}

#[test]
fn read_blob_object_successfully() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    init_repository(&dir);
    let (file_name, file_content) = create_random_file(&dir);

    let oid = common::stdout_oid(&mut common::wit_command(
        dir.path(),
        &["hash-object", "-w", &file_name],
    ));

    let mut sut = common::wit_command(dir.path(), &["cat-file", "-p", &oid]);

    sut.assert().success().stdout(predicate::eq(file_content));

    Ok(())
}

#[test]
fn read_blob_object_from_abbreviated_id() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    init_repository(&dir);
    let (file_name, file_content) = create_random_file(&dir);

    let oid = common::stdout_oid(&mut common::wit_command(
        dir.path(),
        &["hash-object", "-w", &file_name],
    ));

    let mut sut = common::wit_command(dir.path(), &["cat-file", "-p", &oid[..7]]);

    sut.assert().success().stdout(predicate::eq(file_content));

    Ok(())
}

#[test]
fn read_missing_object_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    init_repository(&dir);

    let mut sut = common::wit_command(
        dir.path(),
        &["cat-file", "-p", "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef"],
    );

    sut.assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    Ok(())
}

#[test]
fn commands_work_from_a_nested_directory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    init_repository(&dir);
    let nested = dir.path().join("sub").join("dir");
    std::fs::create_dir_all(&nested)?;
    let (file_name, file_content) = create_random_file(&dir);

    // hash from the repository root, read back from a nested directory
    let oid = common::stdout_oid(&mut common::wit_command(
        dir.path(),
        &["hash-object", "-w", &file_name],
    ));

    let mut sut = common::wit_command(&nested, &["cat-file", "-p", &oid]);

    sut.assert().success().stdout(predicate::eq(file_content));

    Ok(())
}

#[test]
fn commands_outside_a_repository_fail() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;

    let mut sut = common::wit_command(
        dir.path(),
        &["cat-file", "-p", "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef"],
    );

    sut.assert()
        .failure()
        .stderr(predicate::str::contains("no wit repository found"));

    Ok(())
}
