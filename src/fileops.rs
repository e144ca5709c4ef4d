//! Local file management: create, read, write, delete, directory listing,
//! extension-based organizing, and project scaffolding.

use anyhow::{Context, bail};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Refuse to slurp files past this size.
const MAX_READ_BYTES: u64 = 10 * 1024 * 1024;

/// Cap on characters returned for display.
const MAX_DISPLAY_CHARS: usize = 5000;

/// Create a new file, failing if it already exists.
pub fn create_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if path.exists() {
        bail!("'{}' already exists", path.display());
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to create {}", path.display()))?;
    info!(path = %path.display(), "created file");
    Ok(())
}

/// Write content to a file, appending when `append` is set.
pub fn write_file(path: &Path, content: &str, append: bool) -> anyhow::Result<()> {
    if append {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("failed to append to {}", path.display()))?;
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

/// Read a file for display. Binary files and files over the size cap are
/// rejected; long contents are truncated with a marker.
pub fn read_file(path: &Path) -> anyhow::Result<String> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("'{}' not found", path.display()))?;
    if !meta.is_file() {
        bail!("'{}' is not a file", path.display());
    }
    if meta.len() > MAX_READ_BYTES {
        bail!(
            "'{}' is too large to display ({})",
            path.display(),
            format_size(meta.len())
        );
    }

    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(_) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            bail!("'{}' looks binary ({mime}); refusing to display", path.display());
        }
    };

    if content.chars().count() > MAX_DISPLAY_CHARS {
        let shown: String = content.chars().take(MAX_DISPLAY_CHARS).collect();
        let total = content.chars().count();
        Ok(format!(
            "{shown}\n\n... [truncated, {total} characters total]"
        ))
    } else {
        Ok(content)
    }
}

/// Delete a regular file. Directories are refused.
pub fn delete_file(path: &Path) -> anyhow::Result<()> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("'{}' not found", path.display()))?;
    if !meta.is_file() {
        bail!("'{}' is not a file; directories are not deleted", path.display());
    }
    std::fs::remove_file(path)
        .with_context(|| format!("failed to delete {}", path.display()))?;
    info!(path = %path.display(), "deleted file");
    Ok(())
}

pub fn create_directory(path: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    Ok(())
}

/// One row of a directory listing.
#[derive(Debug)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// List a directory, directories first, then files, each alphabetical.
pub fn list_directory(path: &Path) -> anyhow::Result<Vec<DirEntryInfo>> {
    let mut entries = Vec::new();
    let read = std::fs::read_dir(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    for entry in read {
        let entry = entry?;
        let meta = entry.metadata()?;
        entries.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: meta.is_dir(),
            size: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Local>::from),
        });
    }
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then(a.name.cmp(&b.name)));
    Ok(entries)
}

/// Render a listing. The detailed form adds sizes, mtimes, and a summary
/// line; the plain form is names only.
pub fn render_listing(entries: &[DirEntryInfo], detailed: bool) -> String {
    if entries.is_empty() {
        return "Directory is empty.".to_string();
    }

    let mut lines: Vec<String> = entries
        .iter()
        .map(|e| {
            if !detailed {
                if e.is_dir {
                    format!("  {}/", e.name)
                } else {
                    format!("  {}", e.name)
                }
            } else if e.is_dir {
                format!("  {:>9}  {:<19}  {}/", "[dir]", "", e.name)
            } else {
                let mtime = e
                    .modified
                    .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default();
                format!("  {:>9}  {mtime:<19}  {}", format_size(e.size), e.name)
            }
        })
        .collect();

    if detailed {
        let dirs = entries.iter().filter(|e| e.is_dir).count();
        let files = entries.len() - dirs;
        let total: u64 = entries.iter().filter(|e| !e.is_dir).map(|e| e.size).sum();
        lines.push(format!(
            "  {dirs} directories, {files} files, {} total",
            format_size(total)
        ));
    }
    lines.join("\n")
}

/// File categories used by `organize_files`, keyed by extension.
fn category_for(extension: &str) -> Option<&'static str> {
    let ext = extension.to_ascii_lowercase();
    let category = match ext.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" | "ico" => "images",
        "pdf" | "doc" | "docx" | "txt" | "md" | "rtf" | "odt" | "epub" => "documents",
        "mp4" | "avi" | "mkv" | "mov" | "wmv" | "webm" => "videos",
        "mp3" | "wav" | "flac" | "ogg" | "m4a" | "aac" => "audio",
        "rs" | "py" | "js" | "ts" | "c" | "cpp" | "h" | "go" | "java" | "sh" | "rb" => "code",
        "zip" | "tar" | "gz" | "bz2" | "xz" | "rar" | "7z" => "archives",
        "csv" | "json" | "xml" | "yaml" | "yml" | "toml" | "sql" | "parquet" => "data",
        "ttf" | "otf" | "woff" | "woff2" => "fonts",
        "ini" | "cfg" | "conf" | "env" => "config",
        _ => return None,
    };
    Some(category)
}

/// Outcome of an organize pass.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    pub moved: usize,
    pub skipped: usize,
    /// Files moved per category directory.
    pub by_category: BTreeMap<String, usize>,
}

/// Sort loose files in `dir` into category subdirectories by extension.
/// Unrecognized extensions, subdirectories, and name collisions are left
/// alone; category directories that end up unused are removed again.
pub fn organize_files(dir: &Path) -> anyhow::Result<OrganizeReport> {
    if !dir.is_dir() {
        bail!("'{}' is not a directory", dir.display());
    }

    let mut report = OrganizeReport::default();
    let mut created: Vec<PathBuf> = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(category) = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(category_for)
        else {
            report.skipped += 1;
            continue;
        };

        let target_dir = dir.join(category);
        if !target_dir.exists() {
            std::fs::create_dir(&target_dir)
                .with_context(|| format!("failed to create {}", target_dir.display()))?;
            created.push(target_dir.clone());
        }

        let target = target_dir.join(entry.file_name());
        if target.exists() {
            debug!(target = %target.display(), "skipping move, target exists");
            report.skipped += 1;
            continue;
        }

        std::fs::rename(&path, &target)
            .with_context(|| format!("failed to move {}", path.display()))?;
        report.moved += 1;
        *report.by_category.entry(category.to_string()).or_insert(0) += 1;
    }

    // Drop category dirs we created but never filled.
    for target_dir in created {
        if std::fs::read_dir(&target_dir)
            .map(|mut d| d.next().is_none())
            .unwrap_or(false)
        {
            let _ = std::fs::remove_dir(&target_dir);
        }
    }

    Ok(report)
}

/// Project templates known to `create_project`.
pub const PROJECT_KINDS: &[&str] = &["python", "web", "rust"];

/// Scaffold a starter project under `root/name`.
pub fn create_project(root: &Path, name: &str, kind: &str) -> anyhow::Result<PathBuf> {
    if name.is_empty() || name.contains(['/', '\\']) {
        bail!("invalid project name '{name}'");
    }
    let project = root.join(name);
    if project.exists() {
        bail!("'{}' already exists", project.display());
    }

    match kind {
        "python" => {
            std::fs::create_dir_all(project.join("src"))?;
            std::fs::create_dir_all(project.join("tests"))?;
            std::fs::write(
                project.join("src").join("main.py"),
                format!(
                    "def main():\n    print(\"Hello from {name}\")\n\n\nif __name__ == \"__main__\":\n    main()\n"
                ),
            )?;
            std::fs::write(project.join("requirements.txt"), "")?;
            std::fs::write(project.join("README.md"), format!("# {name}\n"))?;
        }
        "web" => {
            std::fs::create_dir_all(project.join("css"))?;
            std::fs::create_dir_all(project.join("js"))?;
            std::fs::write(
                project.join("index.html"),
                format!(
                    "<!DOCTYPE html>\n<html>\n<head>\n  <title>{name}</title>\n  <link rel=\"stylesheet\" href=\"css/style.css\">\n</head>\n<body>\n  <h1>{name}</h1>\n  <script src=\"js/app.js\"></script>\n</body>\n</html>\n"
                ),
            )?;
            std::fs::write(project.join("css").join("style.css"), "body { font-family: sans-serif; }\n")?;
            std::fs::write(project.join("js").join("app.js"), "console.log(\"ready\");\n")?;
        }
        "rust" => {
            std::fs::create_dir_all(project.join("src"))?;
            std::fs::write(
                project.join("Cargo.toml"),
                format!(
                    "[package]\nname = \"{name}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n\n[dependencies]\n"
                ),
            )?;
            std::fs::write(
                project.join("src").join("main.rs"),
                "fn main() {\n    println!(\"Hello, world!\");\n}\n",
            )?;
        }
        other => bail!("unknown project type '{other}' (expected one of {PROJECT_KINDS:?})"),
    }

    info!(path = %project.display(), kind, "scaffolded project");
    Ok(project)
}

/// Metadata summary for a single file.
#[derive(Debug)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub human_size: String,
    pub modified: Option<DateTime<Local>>,
    pub mime: String,
    pub is_dir: bool,
}

pub fn file_info(path: &Path) -> anyhow::Result<FileInfo> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("'{}' not found", path.display()))?;
    let modified = meta.modified().ok().map(DateTime::<Local>::from);
    let mime = if meta.is_dir() {
        "inode/directory".to_string()
    } else {
        mime_guess::from_path(path).first_or_octet_stream().to_string()
    };
    Ok(FileInfo {
        path: path.to_path_buf(),
        size: meta.len(),
        human_size: format_size(meta.len()),
        modified,
        mime,
        is_dir: meta.is_dir(),
    })
}

impl FileInfo {
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}\n  type: {}\n  size: {}",
            self.path.display(),
            if self.is_dir { "directory" } else { &self.mime },
            self.human_size
        );
        if let Some(modified) = self.modified {
            out.push_str(&format!(
                "\n  modified: {}",
                modified.format("%Y-%m-%d %H:%M:%S")
            ));
        }
        out
    }
}

/// Human-readable byte size, one decimal above bytes.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
