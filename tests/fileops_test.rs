use std::path::PathBuf;

use jarvisx::fileops;

fn tmp_dir() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("jarvisx-fileops-test-{nanos}"));
    std::fs::create_dir_all(&path).expect("create temp dir");
    path
}

#[test]
fn create_read_delete_round_trip() {
    let dir = tmp_dir();
    let file = dir.join("note.txt");

    fileops::create_file(&file, "hello").expect("create");
    assert_eq!(fileops::read_file(&file).expect("read"), "hello");

    fileops::delete_file(&file).expect("delete");
    assert!(!file.exists());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn create_refuses_to_clobber() {
    let dir = tmp_dir();
    let file = dir.join("note.txt");
    fileops::create_file(&file, "first").expect("create");

    let err = fileops::create_file(&file, "second").expect_err("should fail");
    assert!(err.to_string().contains("already exists"));
    assert_eq!(fileops::read_file(&file).unwrap(), "first");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn write_appends_when_asked() {
    let dir = tmp_dir();
    let file = dir.join("log.txt");

    fileops::write_file(&file, "one\n", false).expect("write");
    fileops::write_file(&file, "two\n", true).expect("append");
    assert_eq!(fileops::read_file(&file).unwrap(), "one\ntwo\n");

    fileops::write_file(&file, "reset\n", false).expect("overwrite");
    assert_eq!(fileops::read_file(&file).unwrap(), "reset\n");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn binary_files_are_refused() {
    let dir = tmp_dir();
    let file = dir.join("blob.bin");
    std::fs::write(&file, [0u8, 159, 146, 150, 255]).expect("write bytes");

    let err = fileops::read_file(&file).expect_err("should refuse");
    assert!(err.to_string().contains("binary"));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn long_contents_are_truncated_for_display() {
    let dir = tmp_dir();
    let file = dir.join("big.txt");
    std::fs::write(&file, "x".repeat(6000)).expect("write");

    let shown = fileops::read_file(&file).expect("read");
    assert!(shown.contains("[truncated"));
    assert!(shown.len() < 6000);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn delete_refuses_directories() {
    let dir = tmp_dir();
    let sub = dir.join("subdir");
    std::fs::create_dir(&sub).expect("mkdir");

    assert!(fileops::delete_file(&sub).is_err());
    assert!(sub.exists());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn listing_puts_directories_first() {
    let dir = tmp_dir();
    std::fs::write(dir.join("a.txt"), "x").unwrap();
    std::fs::create_dir(dir.join("zdir")).unwrap();
    std::fs::write(dir.join("b.txt"), "y").unwrap();

    let entries = fileops::list_directory(&dir).expect("list");
    assert_eq!(entries[0].name, "zdir");
    assert!(entries[0].is_dir);
    assert_eq!(entries[1].name, "a.txt");
    assert_eq!(entries[2].name, "b.txt");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn organize_sorts_by_extension_and_skips_unknowns() {
    let dir = tmp_dir();
    std::fs::write(dir.join("photo.JPG"), "").unwrap();
    std::fs::write(dir.join("paper.pdf"), "").unwrap();
    std::fs::write(dir.join("script.py"), "").unwrap();
    std::fs::write(dir.join("weird.qcow2"), "").unwrap();
    std::fs::create_dir(dir.join("existing")).unwrap();

    let report = fileops::organize_files(&dir).expect("organize");
    assert_eq!(report.moved, 3);
    assert_eq!(report.skipped, 1);
    assert!(dir.join("images").join("photo.JPG").exists());
    assert!(dir.join("documents").join("paper.pdf").exists());
    assert!(dir.join("code").join("script.py").exists());
    assert!(dir.join("weird.qcow2").exists());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn organize_leaves_name_collisions_alone() {
    let dir = tmp_dir();
    std::fs::create_dir(dir.join("images")).unwrap();
    std::fs::write(dir.join("images").join("photo.png"), "old").unwrap();
    std::fs::write(dir.join("photo.png"), "new").unwrap();

    let report = fileops::organize_files(&dir).expect("organize");
    assert_eq!(report.moved, 0);
    assert_eq!(report.skipped, 1);
    assert!(dir.join("photo.png").exists());
    assert_eq!(
        std::fs::read_to_string(dir.join("images").join("photo.png")).unwrap(),
        "old"
    );

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn scaffolds_a_rust_project() {
    let dir = tmp_dir();
    let project = fileops::create_project(&dir, "demo", "rust").expect("scaffold");
    assert!(project.join("Cargo.toml").exists());
    assert!(project.join("src").join("main.rs").exists());

    let manifest = std::fs::read_to_string(project.join("Cargo.toml")).unwrap();
    assert!(manifest.contains("name = \"demo\""));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn scaffold_rejects_bad_input() {
    let dir = tmp_dir();
    assert!(fileops::create_project(&dir, "demo", "cobol").is_err());
    assert!(fileops::create_project(&dir, "../escape", "rust").is_err());

    fileops::create_project(&dir, "demo", "python").expect("scaffold");
    assert!(fileops::create_project(&dir, "demo", "python").is_err());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn file_info_reports_size_and_mime() {
    let dir = tmp_dir();
    let file = dir.join("doc.txt");
    std::fs::write(&file, "12345").unwrap();

    let info = fileops::file_info(&file).expect("info");
    assert_eq!(info.size, 5);
    assert_eq!(info.human_size, "5 B");
    assert!(info.mime.starts_with("text/plain"));
    assert!(!info.is_dir);

    std::fs::remove_dir_all(dir).ok();
}
