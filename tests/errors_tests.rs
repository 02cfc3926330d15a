use std::error::Error;
use pagesum::errors::SummarizerError;

#[test]
fn test_summarizer_error_implements_error_trait() {
    fn assert_error<T: Error>(_: &T) {}

    let error = SummarizerError::ExtractionError("test error".to_string());
    assert_error(&error);
}

#[test]
fn test_summarizer_error_display() {
    let error = SummarizerError::RemoteError("quota exceeded".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to reach summarization service: quota exceeded"
    );

    let error = SummarizerError::ExtractionError("no content".to_string());
    assert_eq!(format!("{error}"), "Failed to extract page content: no content");

    assert_eq!(
        format!("{}", SummarizerError::Busy),
        "Another action is still in progress"
    );
}

#[test]
fn test_user_message_is_bare() {
    let error = SummarizerError::RemoteError("quota exceeded".to_string());
    assert_eq!(error.user_message(), "quota exceeded");
}

#[test]
fn test_summarizer_error_from_conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    assert!(matches!(SummarizerError::from(io), SummarizerError::StorageError(_)));

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(SummarizerError::from(json), SummarizerError::StorageError(_)));

    let err = anyhow::anyhow!("page gone");
    match SummarizerError::from(err) {
        SummarizerError::ExtractionError(msg) => assert!(msg.contains("page gone")),
        other => panic!("Unexpected error type: {other:?}"),
    }

    #[allow(unused)]
    fn _check_reqwest_conversion(err: reqwest::Error) -> SummarizerError {
        SummarizerError::from(err)
    }
}
