use plano_core::error::{PlanoError, Result};
use reqwest::Client;

use crate::types::TelegramResponse;

const MAX_MESSAGE_LENGTH: usize = 4096;

pub struct TelegramBot {
    client: Client,
    base_url: String,
}

impl TelegramBot {
    pub fn new(token: String) -> Self {
        let base_url = format!("https://api.telegram.org/bot{token}");
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Send a formatted message, splitting it if it exceeds the Telegram limit.
    /// The chat id is the opaque string key used throughout the stored state.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let chunks = split_message(text);

        for chunk in chunks {
            self.send_single_message(chat_id, &chunk).await?;
        }

        Ok(())
    }

    async fn send_single_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/sendMessage", self.base_url);

        let html = markdown_to_html(text);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": html,
            "parse_mode": "HTML",
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlanoError::Telegram(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlanoError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let telegram_response: TelegramResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| PlanoError::Telegram(e.to_string()))?;

        if !telegram_response.ok {
            return Err(PlanoError::Telegram(
                telegram_response
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(())
    }
}

/// Convert standard Markdown to Telegram-compatible HTML using pulldown-cmark.
///
/// Telegram supports: <b>, <i>, <u>, <s>, <code>, <pre>, <a href="">, <blockquote>.
/// Headers are rendered as bold text. Unsupported elements are passed through as text.
fn markdown_to_html(text: &str) -> String {
    use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

    let options = Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(text, options);

    let mut html = String::with_capacity(text.len() + 128);

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { .. } => html.push_str("\n<b>"),
                Tag::Paragraph => {}
                Tag::Strong => html.push_str("<b>"),
                Tag::Emphasis => html.push_str("<i>"),
                Tag::Strikethrough => html.push_str("<s>"),
                Tag::BlockQuote(_) => html.push_str("<blockquote>"),
                Tag::CodeBlock(kind) => match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                        html.push_str(&format!(
                            "<pre><code class=\"language-{}\">",
                            html_escape(&lang)
                        ));
                    }
                    _ => html.push_str("<pre><code>"),
                },
                Tag::Link { dest_url, .. } => {
                    html.push_str(&format!("<a href=\"{}\">", html_escape(&dest_url)));
                }
                Tag::List(Some(start)) => {
                    html.push_str(&format!("\n{start}. "));
                }
                Tag::List(None) => html.push('\n'),
                Tag::Item => html.push_str("• "),
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Heading(_) => html.push_str("</b>\n"),
                TagEnd::Paragraph => html.push('\n'),
                TagEnd::Strong => html.push_str("</b>"),
                TagEnd::Emphasis => html.push_str("</i>"),
                TagEnd::Strikethrough => html.push_str("</s>"),
                TagEnd::BlockQuote(_) => html.push_str("</blockquote>"),
                TagEnd::CodeBlock => html.push_str("</code></pre>"),
                TagEnd::Link => html.push_str("</a>"),
                TagEnd::Item => html.push('\n'),
                TagEnd::List(_) => {}
                _ => {}
            },
            Event::Text(text) => html.push_str(&html_escape(&text)),
            Event::Code(code) => {
                html.push_str("<code>");
                html.push_str(&html_escape(&code));
                html.push_str("</code>");
            }
            Event::SoftBreak => html.push('\n'),
            Event::HardBreak => html.push('\n'),
            Event::Rule => html.push_str("\n---\n"),
            _ => {}
        }
    }

    html.trim().to_string()
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn split_message(text: &str) -> Vec<String> {
    if text.len() <= MAX_MESSAGE_LENGTH {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= MAX_MESSAGE_LENGTH {
            chunks.push(remaining.to_string());
            break;
        }

        // The limit may land inside a multibyte char; back up to a boundary
        // before slicing.
        let mut boundary = MAX_MESSAGE_LENGTH;
        while !remaining.is_char_boundary(boundary) {
            boundary -= 1;
        }

        let split_pos = match remaining[..boundary].rfind('\n') {
            Some(pos) => pos + 1,
            None => boundary,
        };

        chunks.push(remaining[..split_pos].to_string());
        remaining = &remaining[split_pos..];
    }

    chunks
}
