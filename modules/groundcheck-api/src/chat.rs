// Message routing for the chat front door: commands, links, claims, images.

use base64::Engine;
use serde::Deserialize;
use tracing::{info, warn};

use groundcheck_scout::CheckError;

use crate::session::Mode;
use crate::AppState;

pub const WELCOME: &str = "👋 Welcome to FactCheck Bot!\n\n\
I can help you verify news claims and information. Here's how to use me:\n\
- Send any news headline or claim to fact-check\n\
- Send an image containing text to extract and verify\n\
- Send a URL to analyze its content\n\
- Use /deepfake to enter deepfake detection mode\n\
- Use /help for more information";

pub const HELP: &str = "📋 FactCheck Bot Help:\n\n\
1️⃣ Send any text claim or headline to verify\n\
2️⃣ Send an image containing text to extract and fact-check\n\
3️⃣ Send a URL to analyze its content\n\n\
💡 Special modes:\n\
• /deepfake - Enter deepfake detection mode (all images will be analyzed for manipulation)\n\
• /normal - Return to standard fact-checking mode\n\n\
I'll search for reliable sources and analyze the claim's accuracy.";

pub const FORENSICS_ON: &str = "🔍 *DEEPFAKE DETECTION MODE ACTIVATED* 🔍\n\n\
Now send me any image, and I'll analyze it for signs of AI manipulation or generation.\n\n\
I'll look for:\n\
• Unnatural facial features\n\
• Inconsistent lighting\n\
• Blurry or warped areas\n\
• Other telltale signs of manipulation\n\n\
Use /normal to return to regular fact-checking mode.";

pub const FORENSICS_OFF: &str = "✅ Returned to normal fact-checking mode.\n\n\
Send me any text, image, or URL to fact-check!";

const UNKNOWN_COMMAND: &str = "🤔 I don't know that command. Use /help to see what I can do.";
const NOTHING_TO_CHECK: &str = "Send me a claim, a link or an image to fact-check.";
const UNREADABLE_URL: &str = "⚠️ Could not extract content from that URL. Please check the link and try again.";
const BAD_IMAGE: &str = "❌ Could not read the image. Please send a JPEG or PNG.";
const NO_IMAGE_TEXT: &str = "⚠️ Failed to extract text from the image. Please try a clearer image.";
const IMAGE_ERROR: &str = "❌ Error processing the image. Please try again later.";
const MEDIA_UNAVAILABLE: &str = "⚠️ Image analysis is not available right now.";

const DEFAULT_MIME: &str = "image/jpeg";

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub user_id: String,
    pub text: Option<String>,
    pub image_base64: Option<String>,
    pub mime_type: Option<String>,
}

enum Command {
    Start,
    Help,
    Forensics,
    Normal,
    Unknown,
}

fn parse_command(text: &str) -> Option<Command> {
    let word = text.trim().split_whitespace().next()?;
    let name = word.strip_prefix('/')?;
    // "/help@SomeBot" addresses a specific bot in group chats
    let name = name.split('@').next().unwrap_or(name).to_lowercase();
    Some(match name.as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "deepfake" => Command::Forensics,
        "normal" => Command::Normal,
        _ => Command::Unknown,
    })
}

/// Produce the reply for one incoming message.
pub async fn reply(state: &AppState, message: IncomingMessage) -> String {
    let user_id = message.user_id.as_str();
    let mode = state.sessions.touch(user_id).await;
    let text = message.text.as_deref().map(str::trim).unwrap_or("");

    if let Some(command) = parse_command(text) {
        info!(user_id, command = text, "Command received");
        return match command {
            Command::Start => {
                state.sessions.reset(user_id).await;
                WELCOME.to_string()
            }
            Command::Help => HELP.to_string(),
            Command::Forensics => {
                state.sessions.set_mode(user_id, Mode::ImageForensics).await;
                match &message.image_base64 {
                    Some(image) => {
                        let mime_type = message.mime_type.as_deref();
                        let analysis =
                            handle_image(state, Mode::ImageForensics, image, mime_type).await;
                        format!("{FORENSICS_ON}\n\n{analysis}")
                    }
                    None => FORENSICS_ON.to_string(),
                }
            }
            Command::Normal => {
                state.sessions.reset(user_id).await;
                FORENSICS_OFF.to_string()
            }
            Command::Unknown => UNKNOWN_COMMAND.to_string(),
        };
    }

    if let Some(image) = &message.image_base64 {
        return handle_image(state, mode, image, message.mime_type.as_deref()).await;
    }

    if text.is_empty() {
        return NOTHING_TO_CHECK.to_string();
    }

    check_text(state, text).await
}

async fn check_text(state: &AppState, text: &str) -> String {
    match state.pipeline.check(text).await {
        Ok(report) => report.rendered,
        Err(CheckError::EmptyClaim) => NOTHING_TO_CHECK.to_string(),
        Err(CheckError::UnreadableUrl(url)) => {
            warn!(url = url.as_str(), "Link could not be read");
            UNREADABLE_URL.to_string()
        }
    }
}

async fn handle_image(
    state: &AppState,
    mode: Mode,
    encoded: &str,
    mime_type: Option<&str>,
) -> String {
    let Some(media) = state.pipeline.media() else {
        return MEDIA_UNAVAILABLE.to_string();
    };

    let bytes = match base64::engine::general_purpose::STANDARD.decode(encoded.trim()) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        Ok(_) => return BAD_IMAGE.to_string(),
        Err(e) => {
            warn!(error = %e, "Image is not valid base64");
            return BAD_IMAGE.to_string();
        }
    };
    let mime_type = mime_type.filter(|m| m.starts_with("image/")).unwrap_or(DEFAULT_MIME);

    match mode {
        Mode::ImageForensics => match media.assess_manipulation(&bytes, mime_type).await {
            Ok(assessment) => assessment.render(),
            Err(e) => {
                warn!(error = %e, "Manipulation analysis failed");
                IMAGE_ERROR.to_string()
            }
        },
        Mode::FactCheck => match media.extract_claim_text(&bytes, mime_type).await {
            Ok(Some(extracted)) => {
                let verdict = check_text(state, &extracted).await;
                format!("✅ Extracted Text:\n{extracted}\n\n{verdict}")
            }
            Ok(None) => NO_IMAGE_TEXT.to_string(),
            Err(e) => {
                warn!(error = %e, "Image text extraction failed");
                IMAGE_ERROR.to_string()
            }
        },
    }
}
