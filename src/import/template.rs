use anyhow::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const TEMPLATE_FILE_NAME: &str = "quiz-template.csv";

pub const TEMPLATE_HEADERS: [&str; 8] = [
    "Question",
    "OptionA",
    "OptionB",
    "OptionC",
    "OptionD",
    "CorrectAnswer",
    "Explanation",
    "MediaURLs",
];

// Correct answers are letter codes so they cannot be misread as option numbers.
const TEMPLATE_SAMPLES: [[&str; 8]; 2] = [
    ["What is 2 + 2?", "3", "4", "5", "6", "B", "Basic math addition", ""],
    [
        "Capital of France?",
        "Berlin",
        "Madrid",
        "Paris",
        "Rome",
        "C",
        "Paris is the capital city of France",
        "https://example.com/paris.jpg",
    ],
];

pub fn write_template<W: Write>(destination: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(destination);
    writer.write_record(TEMPLATE_HEADERS)?;
    for sample in TEMPLATE_SAMPLES.iter() {
        writer.write_record(sample)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_template(path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Could not create template at {:?}", path))?;
    write_template(file)
}
