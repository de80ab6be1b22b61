//! Single-shot requests: plant photo diagnosis and farming guides.
//!
//! Input problems come back as [`ValidationError`] before the gateway is
//! touched. Gateway failures never escape: they are logged and replaced by
//! a fixed apology, so the caller always has something to display.

use crate::ai::{GenerateRequest, ModelGateway};
use crate::prompts;
use std::sync::Arc;

/// Largest accepted image payload (4 MiB).
pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

pub const ANALYSIS_APOLOGY: &str =
    "Sorry, I encountered an error while analyzing the image. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select an image first.")]
    MissingImage,

    #[error("File is too large. Please select an image under 4MB.")]
    FileTooLarge { size: usize },

    #[error("Please select an image file.")]
    NotAnImage { mime_type: String },

    #[error("Please enter a topic.")]
    EmptyTopic,
}

pub fn guide_apology(topic: &str) -> String {
    format!("Sorry, I couldn't generate a guide for \"{topic}\". Please try another topic.")
}

/// A picked image file, held in memory for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Build an upload when only the file name is known. The MIME type comes
    /// from the image signature in `bytes`, then from the extension.
    pub fn from_named_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = match image::guess_format(&bytes) {
            Ok(format) => format.to_mime_type().to_string(),
            Err(_) => mime_guess::from_path(&name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        };
        Self::new(name, mime_type, bytes)
    }

    /// Last path component of `name`, for display.
    pub fn file_name(&self) -> &str {
        std::path::Path::new(&self.name)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.name)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn check(&self) -> Result<(), ValidationError> {
        if self.size() > MAX_IMAGE_BYTES {
            return Err(ValidationError::FileTooLarge { size: self.size() });
        }
        if !self.mime_type.starts_with("image/") {
            return Err(ValidationError::NotAnImage {
                mime_type: self.mime_type.clone(),
            });
        }
        Ok(())
    }
}

/// Busy marker for a screen that runs one request at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestSlot {
    busy: bool,
}

impl RequestSlot {
    /// Claim the slot. Returns `false` if a request is already running.
    pub fn try_begin(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    pub fn finish(&mut self) {
        self.busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

#[derive(Clone)]
pub struct PlantAssistant {
    gateway: Arc<dyn ModelGateway>,
}

impl PlantAssistant {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Diagnose the plant in `image`. `Ok` carries either the model's
    /// markdown or [`ANALYSIS_APOLOGY`].
    pub async fn analyze_plant(&self, image: Option<&ImageUpload>) -> Result<String, ValidationError> {
        let image = image.ok_or(ValidationError::MissingImage)?;
        image.check()?;

        let request = GenerateRequest::text(prompts::analysis_prompt())
            .with_attachment(image.mime_type.clone(), image.bytes.clone());
        match self.gateway.generate(request).await {
            Ok(text) => Ok(text),
            Err(err) => {
                tracing::error!(error = %err, file = %image.name, "error analyzing plant image");
                Ok(ANALYSIS_APOLOGY.to_string())
            }
        }
    }

    /// Generate a step-by-step guide on `topic`. `Ok` carries either the
    /// guide or an apology naming the topic.
    pub async fn generate_guide(&self, topic: &str) -> Result<String, ValidationError> {
        if topic.trim().is_empty() {
            return Err(ValidationError::EmptyTopic);
        }

        match self
            .gateway
            .generate(GenerateRequest::text(prompts::guide_prompt(topic)))
            .await
        {
            Ok(text) => Ok(text),
            Err(err) => {
                tracing::error!(error = %err, topic, "error generating resource guide");
                Ok(guide_apology(topic))
            }
        }
    }
}
