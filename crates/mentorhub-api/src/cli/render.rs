//! `mhub render`: preview how content renders, without any model call.

use std::path::Path;

use anyhow::Context;
use serde_json::json;
use tokio::io::AsyncReadExt;

use mentorhub_core::render::{render_as, to_html, to_plain_text};
use mentorhub_types::render::ContentFormat;

use crate::cli::chat::renderer::ChatRenderer;

async fn read_source(file: &Path) -> anyhow::Result<String> {
    if file == Path::new("-") {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("failed to read stdin")?;
        return Ok(content);
    }
    tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))
}

pub async fn render_file(
    file: &Path,
    format: ContentFormat,
    html: bool,
    json: bool,
) -> anyhow::Result<()> {
    let content = read_source(file).await?;
    let rendered = render_as(format, &content);

    if json {
        let value = json!({
            "rendered": rendered,
            "html": to_html(&rendered),
            "plain": to_plain_text(&rendered),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if html {
        println!("{}", to_html(&rendered));
    } else {
        println!("{}", ChatRenderer::new().render(&rendered));
    }
    Ok(())
}
