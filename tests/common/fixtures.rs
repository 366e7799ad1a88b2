// Test fixtures: folder trees, help directories and portfolio maps on disk

use olat_search::core::indexer::portfolio::{MapKind, PortfolioMap};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A course folder tree in a temporary directory
#[allow(dead_code)]
pub struct TestCourse {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestCourse {
    /// Small course: six indexable files, one hidden, one excluded, one binary
    pub fn small() -> Self {
        Self::with_files(&[
            ("syllabus.txt", "Week one covers ownership and borrowing"),
            ("notes/lifetimes.md", "# Lifetimes\n\nBorrowing rules for references"),
            (
                "notes/traits.html",
                "<html><head><title>Traits</title></head><body><p>Trait objects &amp; generics</p></body></html>",
            ),
            ("exercises/ex1.txt", "Implement a linked list"),
            ("exercises/solutions/ex1.rs", "fn main() { println!(\"list\"); }"),
            ("exercises/data.csv", "name,score\nada,10"),
            (".secret/answers.txt", "hidden from the index"),
            ("draft.tmp", "excluded by pattern"),
            ("logo.png", "not a text file"),
        ])
    }

    /// `count` subfolders with `per_folder` files each
    pub fn wide(count: usize, per_folder: usize) -> Self {
        let files: Vec<(String, String)> = (0..count)
            .flat_map(|folder| {
                (0..per_folder).map(move |file| {
                    (
                        format!("folder{folder}/file{file}.txt"),
                        format!("folder {folder} file {file} discusses concurrency"),
                    )
                })
            })
            .collect();
        let refs: Vec<(&str, &str)> = files
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_str()))
            .collect();
        Self::with_files(&refs)
    }

    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for (path, content) in files {
            write_file(&dir.path().join(path), content);
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// A context help directory: `<bundle>/_content/*.html` plus translations
#[allow(dead_code)]
pub struct HelpTree {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl HelpTree {
    /// Two bundles with one page each, translated into `de` and `en`
    pub fn standard() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path();

        write_file(
            &root.join("org.olat.course/_content/course-editor.html"),
            "<h1>$r.translate(\"chelp.course-editor.title\")</h1><p>$r.translate(\"chelp.intro\")</p>",
        );
        write_file(
            &root.join("org.olat.course/_i18n/LocalStrings_en.properties"),
            "chelp.course-editor.title=Course editor\nchelp.intro=Build your course structure",
        );
        write_file(
            &root.join("org.olat.course/_i18n/LocalStrings_de.properties"),
            "chelp.course-editor.title=Kurseditor\nchelp.intro=Kursstruktur aufbauen",
        );
        write_file(
            &root.join("org.olat.portfolio/_content/maps.html"),
            "<p>$r.translate(\"chelp.maps.body\")</p>",
        );
        write_file(
            &root.join("org.olat.portfolio/_i18n/LocalStrings_en.properties"),
            "chelp.maps.title=Portfolio maps\nchelp.maps.body=Collect artefacts in maps",
        );

        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// One map of each kind plus a second default map
#[allow(dead_code)]
pub fn portfolio_maps() -> Vec<PortfolioMap> {
    vec![
        PortfolioMap::new(1, MapKind::Default, "Semester reflections")
            .owned_by(10)
            .with_description("Reflections on ownership exercises"),
        PortfolioMap::new(2, MapKind::Default, "Shared notes")
            .owned_by(11)
            .shared_with(12)
            .with_page("Week one", "Borrowing practice"),
        PortfolioMap::new(3, MapKind::Structured, "Course portfolio")
            .owned_by(10)
            .public()
            .with_page("Task", "Submit a reflection"),
        PortfolioMap::new(4, MapKind::Template, "Portfolio template")
            .owned_by(20)
            .with_description("Template for course portfolios"),
    ]
}

/// Write maps to `dir/maps.json`
#[allow(dead_code)]
pub fn write_portfolio_file(dir: &Path, maps: &[PortfolioMap]) -> PathBuf {
    let path = dir.join("maps.json");
    let json = serde_json::to_string_pretty(maps).expect("Failed to serialize maps");
    fs::write(&path, json).expect("Failed to write maps");
    path
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
}
