//! End-to-end pipeline tests over the public API, with an in-memory page
//! source standing in for the PDF reader.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use campus_rag::chunk::split_text;
use campus_rag::config::load_config;
use campus_rag::label::{build_labeled_chunks, ensure_unique_labels};
use campus_rag::pdf::{PageContent, PageSource};

struct FakePages {
    docs: HashMap<PathBuf, Vec<PageContent>>,
}

impl PageSource for FakePages {
    fn read_pages(&self, path: &Path) -> Result<Vec<PageContent>> {
        self.docs
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unreadable PDF: {}", path.display()))
    }
}

fn page(text: &str, left: &str, right: &str) -> PageContent {
    PageContent {
        text: text.to_string(),
        left_text: left.to_string(),
        right_text: right.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_full_labeling_pipeline() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();

    let handouts_dir = root.join("handouts");
    std::fs::create_dir(&handouts_dir).unwrap();
    std::fs::write(handouts_dir.join("cs101_handout.pdf"), b"stub").unwrap();
    std::fs::write(handouts_dir.join("notes.txt"), b"not a pdf").unwrap();

    let timetable_path = root.join("timetable.json");
    std::fs::write(
        &timetable_path,
        r#"{"courses": {
            "CS F111": {
                "course_name": "Computer Programming",
                "units": 4,
                "sections": {
                    "L1": {
                        "instructor": ["Rao", "Iyer"],
                        "schedule": [{"room": "6151", "days": ["M", "W"], "hours": [3, 4]}]
                    }
                },
                "exams": [{"midsem": "10/10 AN", "compre": "12/12 FN"}]
            }
        }}"#,
    )
    .unwrap();

    let config_path = root.join("campus.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[sources]
bulletins = ["{root}/bulletin.pdf"]
tabular = ["{root}/courses.pdf"]
handouts_dir = "{root}/handouts"
timetable = "{root}/timetable.json"
"#,
            root = root.display()
        ),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();

    let mut docs = HashMap::new();
    docs.insert(
        root.join("bulletin.pdf"),
        vec![page("", "Academic calendar", "Holiday list")],
    );
    docs.insert(
        root.join("courses.pdf"),
        vec![PageContent {
            text: "Offered courses".to_string(),
            tables: vec![vec![
                vec![Some("CS F111".to_string()), Some("Computer\nProgramming".to_string())],
                vec![Some("4".to_string()), None],
            ]],
            ..Default::default()
        }],
    );
    docs.insert(
        handouts_dir.join("cs101_handout.pdf"),
        vec![page("Evaluation: 30% midsem, 40% compre", "", "")],
    );

    let (chunks, report) = build_labeled_chunks(&config, &FakePages { docs });
    assert_eq!(report.failed(), 0);
    ensure_unique_labels(&chunks).unwrap();

    let labels: Vec<&str> = chunks.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "bulletin_0_chunk_0",
            "pdf_content_0_chunk_0",
            "handout_0",
            "course_0_chunk_0",
        ]
    );

    // Bulletin: left column, newline, right column.
    assert_eq!(chunks[0].content, "Academic calendar\nHoliday list\n");

    // Tabular: page text, then the flattened table with in-cell newlines
    // collapsed and cells joined by " - ".
    assert_eq!(
        chunks[1].content,
        "Offered courses\nCS F111 - Computer Programming\n4 - \n"
    );

    // Handout: one unsplit chunk, text preserved.
    assert!(chunks[2].content.contains("30% midsem"));

    // Timetable: the rendered course block.
    let course = &chunks[3].content;
    assert!(course.starts_with("Course No: CS F111\nCourse Name: Computer Programming\nUnits: 4"));
    assert!(course.contains("Section: L1\nInstructors: Rao, Iyer"));
    assert!(course.contains("Room: 6151, Days: M, W, Hours: 3, 4"));
    assert!(course.contains("Exams:\nMidsem: 10/10 AN, Compre: 12/12 FN"));
}

#[test]
fn test_long_document_splits_with_overlap_and_reconstructs() {
    let paragraphs: Vec<String> = (0..40)
        .map(|i| format!("Paragraph {} covers registration deadlines and fee details.", i))
        .collect();
    let text = paragraphs.join("\n\n");

    let chunks = split_text(&text, 300, 80);
    assert!(chunks.len() > 1);

    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 300);
        assert!(chunk.overlap <= 80);
    }

    // Dropping each chunk's overlap prefix and concatenating the rest
    // reproduces the input exactly.
    let rebuilt: String = chunks.iter().map(|c| c.core()).collect();
    assert_eq!(rebuilt, text);
}

#[test]
fn test_config_rejects_bad_chunking() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("bad.toml");
    std::fs::write(
        &path,
        "[sources]\n[chunking]\nchunk_size = 200\nchunk_overlap = 300\n",
    )
    .unwrap();
    assert!(load_config(&path).is_err());
}
