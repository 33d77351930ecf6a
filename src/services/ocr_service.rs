//! OCR 服务 - 业务能力层
//!
//! 只负责"识别一张图片上的标签"能力，不关心分组和流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 图片以 base64 `data:` URL 的形式放进 Vision 消息
//! - 兼容 OpenAI API 的服务（默认使用 Gemini 的兼容端点）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppResult, LabelerError};
use crate::models::ImagePayload;

/// 发送给 OCR 模型的固定指令
pub const OCR_PROMPT: &str = r#"You are an expert OCR assistant. I will provide an image of a device with a sticker.

TASK:
1. Identify the primary label. There are two possible types:
  - Type A: A sticker with an x-y-z axis and a title starting with 'acc' (e.g., acc-5).
  - Type B: A sticker with a 1-2-3 axis and a title starting with 'R' (e.g., R-12).
2. Extract the title and its number only.
3. Ignore all coordinate system drawings (x,y,z or 1,2,3).
4. Formatting: Return the label in UPPERCASE (e.g., ACC-5 or R-12).

STRICT OUTPUT:
Return ONLY the label. No explanations, no extra text."#;

/// OCR 引擎
///
/// 识别流程只依赖这个 trait，测试时可以替换为假实现。
/// 返回模型的原始文字回复，清洗由调用方负责。
pub trait OcrEngine: Send + Sync {
    fn recognize<'a>(
        &'a self,
        credential: &'a str,
        image: &'a ImagePayload,
    ) -> BoxFuture<'a, AppResult<String>>;
}

/// OCR 服务
///
/// 职责：
/// - 调用 Vision 模型识别贴纸上的标签
/// - 只处理单张图片
/// - 不出现分组、不修改存储
pub struct OcrService {
    api_base_url: String,
    model_name: String,
}

impl OcrService {
    /// 创建新的 OCR 服务
    pub fn new(config: &Config) -> Self {
        Self {
            api_base_url: config.ocr_api_base_url.clone(),
            model_name: config.ocr_model_name.clone(),
        }
    }

    /// 识别一张图片
    ///
    /// API Key 由调用方每次传入，服务本身不保存。
    pub async fn send_image(&self, credential: &str, image: &ImagePayload) -> AppResult<String> {
        if credential.trim().is_empty() {
            return Err(LabelerError::MissingCredential);
        }

        debug!(
            "调用 OCR API，模型: {}，图片: {} ({} 字节)",
            self.model_name,
            image.media_type,
            image.bytes.len()
        );

        let openai_config = OpenAIConfig::new()
            .with_api_key(credential)
            .with_api_base(&self.api_base_url);
        let client = Client::with_config(openai_config);

        let content_parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: OCR_PROMPT.to_string(),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: to_data_url(image),
                        detail: Some(ImageDetail::High),
                    },
                },
            ),
        ];

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()
            .map_err(|e| self.failure(e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(0.0)
            .max_tokens(1024u32)
            .build()
            .map_err(|e| self.failure(e))?;

        let response = client.chat().create(request).await.map_err(|e| {
            warn!("OCR API 调用失败: {}", e);
            self.failure(e)
        })?;

        debug!("OCR API 调用成功");

        // 没有 choices 视为响应格式错误；有 choice 但内容为空交给调用方处理为 UNKNOWN
        let choice = response
            .choices
            .first()
            .ok_or_else(|| self.failure("OCR 返回结果为空"))?;

        Ok(choice.message.content.clone().unwrap_or_default())
    }

    fn failure(&self, message: impl std::fmt::Display) -> LabelerError {
        LabelerError::service_call_failed(&self.model_name, message)
    }
}

impl OcrEngine for OcrService {
    fn recognize<'a>(
        &'a self,
        credential: &'a str,
        image: &'a ImagePayload,
    ) -> BoxFuture<'a, AppResult<String>> {
        self.send_image(credential, image).boxed()
    }
}

/// 把图片编码为 `data:<media-type>;base64,...`
pub fn to_data_url(image: &ImagePayload) -> String {
    format!("data:{};base64,{}", image.media_type, STANDARD.encode(&image.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> OcrService {
        OcrService::new(&Config::default())
    }

    #[test]
    fn test_data_url() {
        let image = ImagePayload::new(b"hello".to_vec(), "image/png");
        assert_eq!(to_data_url(&image), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_prompt_describes_both_label_types() {
        assert!(OCR_PROMPT.contains("acc"));
        assert!(OCR_PROMPT.contains("'R'"));
        assert!(OCR_PROMPT.contains("UPPERCASE"));
        assert!(OCR_PROMPT.contains("Ignore all coordinate system drawings"));
    }

    #[tokio::test]
    async fn test_empty_credential_is_rejected_locally() {
        let service = create_test_service();
        let image = ImagePayload::new(vec![0u8; 8], "image/jpeg");

        let result = service.recognize("  ", &image).await;
        assert!(matches!(result, Err(LabelerError::MissingCredential)));
    }

    /// 测试真实 OCR 调用
    ///
    /// 运行方式：
    /// ```bash
    /// OCR_API_KEY=... OCR_TEST_IMAGE=sticker.jpg cargo test test_live_ocr -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_ocr() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env();
        let service = OcrService::new(&config);
        let image_path = std::env::var("OCR_TEST_IMAGE").expect("需要设置 OCR_TEST_IMAGE");
        let record = crate::models::loaders::load_image(std::path::Path::new(&image_path))
            .await
            .expect("读取测试图片失败");

        let text = service
            .recognize(&config.ocr_api_key, &record.file)
            .await
            .expect("OCR 调用失败");

        println!("OCR 结果: {}", text);
        assert!(!text.trim().is_empty());
    }
}
