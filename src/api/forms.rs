//! Execution forms for `POST /pipeline/run` and `POST /benchmark`.
//!
//! Validation runs before anything touches the network; a form that fails it
//! never produces a request.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};

use super::error::{FetchError, FetchResult};

pub const DEFAULT_ENV_ID: &str = "default_env";
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

const UPLOAD_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Run a pipeline once against an uploaded spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRunForm {
    pub file: Option<PathBuf>,
    pub pipeline_name: String,
    pub env_id: String,
    pub pipeline_route: String,
    pub timeout_secs: u64,
}

impl Default for PipelineRunForm {
    fn default() -> Self {
        Self {
            file: None,
            pipeline_name: String::new(),
            env_id: DEFAULT_ENV_ID.to_string(),
            pipeline_route: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PipelineRunForm {
    pub fn validate(&self) -> FetchResult<&Path> {
        let Some(file) = self.file.as_deref() else {
            return Err(FetchError::Validation(
                "Please select a file to upload".to_string(),
            ));
        };
        let ext = file
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !UPLOAD_EXTENSIONS.contains(&ext.as_str()) {
            return Err(FetchError::Validation(format!(
                "Unsupported file type for {}: expected .xlsx or .xls",
                file.display()
            )));
        }
        require("Pipeline name", &self.pipeline_name)?;
        require("Pipeline route", &self.pipeline_route)?;
        require_timeout(self.timeout_secs)?;
        Ok(file)
    }

    /// Text parts in submission order (the file part is added separately).
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let env_id = if self.env_id.trim().is_empty() {
            DEFAULT_ENV_ID.to_string()
        } else {
            self.env_id.trim().to_string()
        };
        vec![
            ("pipeline_name", self.pipeline_name.trim().to_string()),
            ("env_id", env_id),
            ("pipeline_route", self.pipeline_route.trim().to_string()),
            ("timeout", self.timeout_secs.to_string()),
        ]
    }

    /// Validate, read the upload, and build the multipart body.
    pub async fn into_multipart(&self) -> FetchResult<Form> {
        let path = self.validate()?;
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            FetchError::Validation(format!("Cannot read {}: {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.xlsx".to_string());
        let part = Part::bytes(bytes).file_name(file_name);
        let form = self
            .text_fields()
            .into_iter()
            .fold(Form::new().part("file", part), |form, (k, v)| form.text(k, v));
        Ok(form)
    }
}

/// Benchmark a pipeline route across every environment the backend knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkRunForm {
    pub pipeline_name: String,
    pub pipeline_route: String,
    pub timeout_secs: u64,
    /// Ask the backend to substitute its mock provider.
    pub use_mock: bool,
}

impl Default for BenchmarkRunForm {
    fn default() -> Self {
        Self {
            pipeline_name: String::new(),
            pipeline_route: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            use_mock: false,
        }
    }
}

impl BenchmarkRunForm {
    pub fn validate(&self) -> FetchResult<()> {
        require("Pipeline name", &self.pipeline_name)?;
        require("Pipeline route", &self.pipeline_route)?;
        require_timeout(self.timeout_secs)
    }

    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("pipeline_name", self.pipeline_name.trim().to_string()),
            ("pipeline_route", self.pipeline_route.trim().to_string()),
            ("timeout", self.timeout_secs.to_string()),
        ];
        if self.use_mock {
            fields.push(("use_mock", "true".to_string()));
        }
        fields
    }

    pub fn into_multipart(&self) -> FetchResult<Form> {
        self.validate()?;
        Ok(self
            .text_fields()
            .into_iter()
            .fold(Form::new(), |form, (k, v)| form.text(k, v)))
    }
}

fn require(label: &str, value: &str) -> FetchResult<()> {
    if value.trim().is_empty() {
        return Err(FetchError::Validation(format!("{label} is required")));
    }
    Ok(())
}

fn require_timeout(secs: u64) -> FetchResult<()> {
    if secs == 0 {
        return Err(FetchError::Validation(
            "Timeout must be a positive number of seconds".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_pipeline_form() -> PipelineRunForm {
        PipelineRunForm {
            file: Some(PathBuf::from("data/customers.xlsx")),
            pipeline_name: "n8n-v2".into(),
            pipeline_route: "webhook/column-fit".into(),
            ..PipelineRunForm::default()
        }
    }

    #[test]
    fn defaults_match_execution_page() {
        let form = PipelineRunForm::default();
        assert_eq!(form.env_id, "default_env");
        assert_eq!(form.timeout_secs, 600);
        assert_eq!(BenchmarkRunForm::default().timeout_secs, 600);
    }

    #[test]
    fn missing_file_is_rejected_first() {
        let form = PipelineRunForm {
            file: None,
            ..filled_pipeline_form()
        };
        assert_eq!(
            form.validate().unwrap_err(),
            FetchError::Validation("Please select a file to upload".into())
        );
    }

    #[test]
    fn non_spreadsheet_upload_is_rejected() {
        let form = PipelineRunForm {
            file: Some(PathBuf::from("notes.csv")),
            ..filled_pipeline_form()
        };
        assert!(matches!(form.validate(), Err(FetchError::Validation(_))));

        let upper = PipelineRunForm {
            file: Some(PathBuf::from("REPORT.XLS")),
            ..filled_pipeline_form()
        };
        assert!(upper.validate().is_ok());
    }

    #[test]
    fn blank_required_text_fields_are_rejected() {
        let form = PipelineRunForm {
            pipeline_route: "   ".into(),
            ..filled_pipeline_form()
        };
        assert_eq!(
            form.validate().unwrap_err().user_message(),
            "Pipeline route is required"
        );

        let bench = BenchmarkRunForm {
            pipeline_route: "r".into(),
            ..BenchmarkRunForm::default()
        };
        assert_eq!(
            bench.validate().unwrap_err().user_message(),
            "Pipeline name is required"
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let bench = BenchmarkRunForm {
            pipeline_name: "p".into(),
            pipeline_route: "r".into(),
            timeout_secs: 0,
            use_mock: false,
        };
        assert!(matches!(bench.validate(), Err(FetchError::Validation(_))));
    }

    #[test]
    fn text_fields_fill_blank_env_and_flag_mock() {
        let form = PipelineRunForm {
            env_id: " ".into(),
            ..filled_pipeline_form()
        };
        assert!(form.text_fields().contains(&("env_id", "default_env".to_string())));

        let bench = BenchmarkRunForm {
            pipeline_name: "p".into(),
            pipeline_route: "r".into(),
            use_mock: true,
            ..BenchmarkRunForm::default()
        };
        assert_eq!(bench.text_fields().last(), Some(&("use_mock", "true".to_string())));
    }

    #[tokio::test]
    async fn unreadable_upload_is_a_validation_error() {
        let form = PipelineRunForm {
            file: Some(PathBuf::from("/definitely/not/here.xlsx")),
            ..filled_pipeline_form()
        };
        assert!(matches!(
            form.into_multipart().await,
            Err(FetchError::Validation(_))
        ));
    }
}
