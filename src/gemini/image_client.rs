use crate::{
    auth::ApiKeySlot,
    capability::ImageCapability,
    config::StudioConfig,
    error::{Result, StudioError},
    models::{
        gemini::{
            ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse,
            GenerationConfig, ImageConfig, Part,
        },
        AspectRatio, ImagePayload, ModelInfo, ModelRole, QualityTier,
    },
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    base_url: String,
    api_key: ApiKeySlot,
    generate_model: String,
    edit_model: String,
}

impl ImageClient {
    /// The key starts out as `config.api_key`; share the slot with a host
    /// through `with_key_slot` so later selections reach this client.
    pub fn new(config: &StudioConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StudioError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: ApiKeySlot::new(config.api_key.clone()),
            generate_model: config.generate_model.clone(),
            edit_model: config.edit_model.clone(),
        })
    }

    pub fn with_key_slot(mut self, slot: ApiKeySlot) -> Self {
        self.api_key = slot;
        self
    }

    pub fn key_slot(&self) -> &ApiKeySlot {
        &self.api_key
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: crate::config::DEFAULT_GENERATE_MODEL.to_string(),
                name: "Gemini 3 Pro Image".to_string(),
                role: ModelRole::Generate,
                description: "High-quality generation and upscaling up to 4K".to_string(),
            },
            ModelInfo {
                id: crate::config::DEFAULT_EDIT_MODEL.to_string(),
                name: "Gemini 2.5 Flash Image".to_string(),
                role: ModelRole::Edit,
                description: "Fast image editing".to_string(),
            },
        ]
    }

    fn endpoint(&self, model_id: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model_id
        )
    }

    async fn invoke(&self, model_id: &str, request: &GenerateContentRequest) -> Result<ImagePayload> {
        log::debug!("🎨 Invoking image model: {}", model_id);
        let api_key = self.api_key.get().ok_or(StudioError::NotAuthorized)?;

        let response = self
            .client
            .post(self.endpoint(model_id))
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| StudioError::CapabilityError(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StudioError::CapabilityError(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = error_message(status, &body);
            log::error!("❌ Image model {} returned {}: {}", model_id, status, message);
            return Err(StudioError::CapabilityError(message));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| StudioError::CapabilityError(format!("Invalid response: {}", e)))?;

        extract_image(parsed)
    }
}

#[async_trait]
impl ImageCapability for ImageClient {
    async fn generate(
        &self,
        prompt: &str,
        quality: QualityTier,
        aspect_ratio: AspectRatio,
    ) -> Result<ImagePayload> {
        log::info!(
            "Generating image with model: {} ({}, {})",
            self.generate_model,
            quality.as_str(),
            aspect_ratio.as_ratio()
        );
        let request = generate_request(prompt, quality, aspect_ratio);
        self.invoke(&self.generate_model, &request).await
    }

    async fn edit(
        &self,
        source_image: &ImagePayload,
        instruction: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<ImagePayload> {
        let request = edit_request(source_image, instruction, aspect_ratio);
        self.invoke(&self.edit_model, &request).await
    }

    async fn upscale(
        &self,
        source_image: &ImagePayload,
        context_prompt: &str,
        quality: QualityTier,
    ) -> Result<ImagePayload> {
        log::info!(
            "Upscaling image with model: {} ({})",
            self.generate_model,
            quality.image_size()
        );
        let request = upscale_request(source_image, context_prompt, quality);
        self.invoke(&self.generate_model, &request).await
    }

    fn generate_model(&self) -> &str {
        &self.generate_model
    }

    fn edit_model(&self) -> &str {
        &self.edit_model
    }
}

fn image_request(parts: Vec<Part>, image_config: ImageConfig) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig {
            response_modalities: vec!["IMAGE".to_string()],
            image_config,
        },
    }
}

pub(crate) fn generate_request(
    prompt: &str,
    quality: QualityTier,
    aspect_ratio: AspectRatio,
) -> GenerateContentRequest {
    image_request(
        vec![Part::text(prompt)],
        ImageConfig {
            aspect_ratio: Some(aspect_ratio.as_ratio().to_string()),
            image_size: Some(quality.image_size().to_string()),
        },
    )
}

pub(crate) fn edit_request(
    source_image: &ImagePayload,
    instruction: &str,
    aspect_ratio: AspectRatio,
) -> GenerateContentRequest {
    image_request(
        vec![
            Part::image(&source_image.mime_type, &source_image.data),
            Part::text(instruction),
        ],
        ImageConfig {
            aspect_ratio: Some(aspect_ratio.as_ratio().to_string()),
            image_size: None,
        },
    )
}

pub(crate) fn upscale_request(
    source_image: &ImagePayload,
    context_prompt: &str,
    quality: QualityTier,
) -> GenerateContentRequest {
    let instruction = format!(
        "Upscale this image to {} resolution. Sharpen fine detail and texture while keeping \
         the composition, colors and subject exactly the same. Original description: {}",
        quality.image_size(),
        context_prompt
    );
    image_request(
        vec![
            Part::image(&source_image.mime_type, &source_image.data),
            Part::text(instruction),
        ],
        ImageConfig {
            aspect_ratio: None,
            image_size: Some(quality.image_size().to_string()),
        },
    )
}

/// First inline image of the first candidate.
pub(crate) fn extract_image(response: GenerateContentResponse) -> Result<ImagePayload> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| StudioError::CapabilityError("No image generated".into()))?;

    let finish_reason = candidate.finish_reason.clone();
    candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.inline_data)
        .find(|data| !data.data.is_empty())
        .map(|data| ImagePayload::new(data.data, data.mime_type))
        .ok_or_else(|| match finish_reason {
            Some(reason) => {
                StudioError::CapabilityError(format!("No image generated (finish reason: {})", reason))
            }
            None => StudioError::CapabilityError("No image generated".into()),
        })
}

/// The service's own error message when the body carries one, so that
/// entitlement wording reaches the matcher unchanged.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        Ok(envelope) => match envelope.error.status {
            Some(status_name) => format!("Request failed with status {}", status_name),
            None => format!("Request failed with status {}", status),
        },
        Err(_) if body.trim().is_empty() => format!("Request failed with status {}", status),
        Err(_) => format!("Request failed with status {}: {}", status, body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_generate_request_body() {
        let request = generate_request("a red fox", QualityTier::High, AspectRatio::Landscape);
        let body: Value = serde_json::to_value(&request).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "a red fox");
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["IMAGE"]));
        assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], "16:9");
        assert_eq!(body["generationConfig"]["imageConfig"]["imageSize"], "2K");
    }

    #[test]
    fn test_edit_request_body() {
        let source = ImagePayload::new("aGk=", "image/jpeg");
        let request = edit_request(&source, "change camera", AspectRatio::Vertical);
        let body: Value = serde_json::to_value(&request).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "aGk=");
        assert_eq!(parts[1]["text"], "change camera");
        assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], "9:16");
        assert!(body["generationConfig"]["imageConfig"].get("imageSize").is_none());
    }

    #[test]
    fn test_upscale_request_body() {
        let source = ImagePayload::new("aGk=", "image/png");
        let request = upscale_request(&source, "a red fox", QualityTier::Ultra);
        let body: Value = serde_json::to_value(&request).unwrap();

        let text = body["contents"][0]["parts"][1]["text"].as_str().unwrap();
        assert!(text.contains("4K"));
        assert!(text.contains("a red fox"));
        assert_eq!(body["generationConfig"]["imageConfig"]["imageSize"], "4K");
    }

    #[test]
    fn test_extract_image() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here is your image" },
                    { "inlineData": { "mimeType": "image/png", "data": "aW1n" } }
                ]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let payload = extract_image(response).unwrap();
        assert_eq!(payload, ImagePayload::new("aW1n", "image/png"));
    }

    #[test]
    fn test_extract_image_without_image_part() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "I can't do that" }] },
                "finishReason": "IMAGE_SAFETY"
            }]
        }))
        .unwrap();
        let err = extract_image(response).unwrap_err();
        assert_eq!(
            err,
            StudioError::CapabilityError("No image generated (finish reason: IMAGE_SAFETY)".into())
        );

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(
            extract_image(empty).unwrap_err(),
            StudioError::CapabilityError("No image generated".into())
        );
    }

    #[test]
    fn test_error_message_passes_service_text_through() {
        let body = json!({
            "error": {
                "code": 404,
                "message": "Requested entity was not found.",
                "status": "NOT_FOUND"
            }
        })
        .to_string();
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, &body),
            "Requested entity was not found."
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "Request failed with status 502 Bad Gateway: upstream down"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, ""),
            "Request failed with status 502 Bad Gateway"
        );
    }

    #[test]
    fn test_new_client() {
        let client = ImageClient::new(
            &StudioConfig::new()
                .with_api_key("k")
                .with_base_url("http://localhost:8080/"),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("flash"),
            "http://localhost:8080/v1beta/models/flash:generateContent"
        );
        assert_eq!(client.edit_model(), crate::config::DEFAULT_EDIT_MODEL);
        assert_eq!(client.key_slot().get().as_deref(), Some("k"));
    }

    #[test]
    fn test_client_sees_key_selected_later() {
        let slot = ApiKeySlot::default();
        let client = ImageClient::new(&StudioConfig::new())
            .unwrap()
            .with_key_slot(slot.clone());
        assert!(!client.key_slot().is_set());

        slot.set(Some("selected".into()));
        assert_eq!(client.key_slot().get().as_deref(), Some("selected"));
    }

    #[tokio::test]
    async fn test_request_without_key_is_not_sent() {
        let client = ImageClient::new(&StudioConfig::new().with_base_url("http://127.0.0.1:9"))
            .unwrap();
        let err = client
            .generate("a cat", QualityTier::Standard, AspectRatio::Square)
            .await
            .unwrap_err();
        assert_eq!(err, StudioError::NotAuthorized);
    }
}
