use eyre::{Context, Result};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Characters that are not allowed in an archive entry name.
const RESERVED: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const FALLBACK_STEM: &str = "untitled";

/// Markdown file name for a conversation title.
pub fn archive_entry_name(title: &str) -> String {
    let stem: String = title.chars().filter(|c| !RESERVED.contains(c)).collect();
    let stem = stem.trim();
    if stem.is_empty() {
        format!("{}.md", FALLBACK_STEM)
    } else {
        format!("{}.md", stem)
    }
}

/// One formatted conversation waiting to be archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub body: String,
}

/// Streams Markdown documents into a zip container.
pub struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
    taken: HashSet<String>,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            zip: ZipWriter::new(inner),
            options: SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated),
            taken: HashSet::new(),
        }
    }

    /// Add a document and return the entry name it was stored under.
    pub fn add_document(&mut self, title: &str, body: &str) -> Result<String> {
        let name = self.unique_name(title);
        self.zip
            .start_file(name.as_str(), self.options)
            .wrap_err_with(|| format!("Failed to start archive entry: {}", name))?;
        self.zip
            .write_all(body.as_bytes())
            .wrap_err_with(|| format!("Failed to write archive entry: {}", name))?;
        Ok(name)
    }

    pub fn finish(self) -> Result<W> {
        self.zip.finish().wrap_err("Failed to finalize archive")
    }

    // Names are compared case-insensitively so the archive unpacks cleanly on
    // case-insensitive filesystems.
    fn unique_name(&mut self, title: &str) -> String {
        let base = archive_entry_name(title);
        let stem = base.trim_end_matches(".md").to_string();
        let mut name = base;
        let mut n = 2;
        while !self.taken.insert(name.to_lowercase()) {
            name = format!("{} ({}).md", stem, n);
            n += 1;
        }
        name
    }
}

/// Write every document to a new zip file at `path`, in order.
///
/// A failure part-way through removes the incomplete file.
pub fn write_archive(path: &Path, documents: &[Document]) -> Result<Vec<String>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(path)
        .wrap_err_with(|| format!("Failed to create archive: {}", path.display()))?;

    let result = (|| -> Result<Vec<String>> {
        let mut archive = ArchiveWriter::new(BufWriter::new(file));
        let mut names = Vec::with_capacity(documents.len());
        for doc in documents {
            names.push(archive.add_document(&doc.title, &doc.body)?);
        }
        let mut writer = archive.finish()?;
        writer.flush().wrap_err("Failed to flush archive")?;
        Ok(names)
    })();

    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}
