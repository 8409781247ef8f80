/// Evaluation dataset loading
///
/// The dataset file is a JSON array of {question, expected_pages} objects,
/// authored by hand against the manual being served.

use std::path::Path;

use crate::errors::ManualQaError;

use super::EvalQuestion;

/// Load evaluation questions from a JSON file.
pub fn load_questions(path: &Path) -> Result<Vec<EvalQuestion>, ManualQaError> {
    let data = std::fs::read_to_string(path).map_err(|e| {
        ManualQaError::Startup(format!(
            "Could not read evaluation dataset at {}: {}",
            path.display(),
            e
        ))
    })?;
    let questions: Vec<EvalQuestion> = serde_json::from_str(&data).map_err(|e| {
        ManualQaError::Startup(format!(
            "Invalid evaluation dataset at {}: {}",
            path.display(),
            e
        ))
    })?;

    if questions.is_empty() {
        return Err(ManualQaError::Startup(
            "Evaluation dataset contains no questions".to_string(),
        ));
    }
    if let Some(q) = questions.iter().find(|q| q.expected_pages.is_empty()) {
        return Err(ManualQaError::Startup(format!(
            "Evaluation question has no expected pages: {}",
            q.question
        )));
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("manualqa_eval_{}.json", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_valid_dataset() {
        let path = write_temp(
            r#"[{"question": "what is the climb limit weight?", "expected_pages": [83]}]"#,
        );
        let questions = load_questions(&path).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].expected_pages, vec![83]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_startup_error() {
        let result = load_questions(Path::new("/nonexistent/eval.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let path = write_temp("[]");
        assert!(load_questions(&path).is_err());
        let _ = std::fs::remove_file(path);
    }
}
