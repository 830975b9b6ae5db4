//! `files.read`, `files.write`, `files.edit`.

use std::fmt::Write as _;
use std::path::Path;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ToolContext;
use crate::error::ToolFailure;
use crate::registry::BuiltinTool;
use crate::util::{confine, file_extra_roots};

/// Default maximum lines `files.read` returns per call.
const DEFAULT_LINE_LIMIT: usize = 2000;
/// Maximum characters kept per displayed line before truncation.
const MAX_LINE_LENGTH: usize = 2000;

fn required_str<'a>(args: &'a Value, field: &str) -> Result<&'a str, ToolFailure> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolFailure::invalid_arguments(format!("{field} is required")))
}

/// `files.read`: reads a UTF-8 file under the workspace boundary, rendering
/// it `cat -n` style with optional line windowing.
pub struct FilesReadTool;

#[async_trait]
impl BuiltinTool for FilesReadTool {
    fn id(&self) -> &'static str {
        "files.read"
    }

    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolFailure> {
        let path_str = required_str(&args, "path")?;
        let path = Path::new(path_str);

        confine(&ctx.workspace, path, &file_extra_roots(&ctx.guardrails))?;

        let max_bytes = args
            .get("maxBytes")
            .and_then(Value::as_u64)
            .unwrap_or(ctx.guardrails.max_read_bytes);

        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| ToolFailure::read_failed(e.to_string()))?;

        if raw.len() as u64 > max_bytes {
            return Err(ToolFailure::file_too_large(max_bytes));
        }

        let check_len = raw.len().min(8192);
        if raw[..check_len].contains(&0) {
            return Err(ToolFailure::binary_not_supported(path_str));
        }

        let content = String::from_utf8(raw)
            .map_err(|_| ToolFailure::binary_not_supported(path_str))?;

        let offset = args
            .get("offset")
            .and_then(Value::as_u64)
            .map(|v| usize::try_from(v).unwrap_or(usize::MAX));
        let limit = args
            .get("limit")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_LINE_LIMIT, |v| usize::try_from(v).unwrap_or(usize::MAX));

        let lines: Vec<&str> = content.lines().collect();
        let total_lines = lines.len();
        let start = offset.map_or(0, |o| o.saturating_sub(1));
        let end = start.saturating_add(limit).min(total_lines);

        let mut rendered = String::new();
        if start < total_lines {
            for (idx, &line) in lines[start..end].iter().enumerate() {
                let line_num = start + idx + 1;
                let display_line = if line.len() > MAX_LINE_LENGTH {
                    &line[..MAX_LINE_LENGTH]
                } else {
                    line
                };
                let _ = writeln!(rendered, "{line_num:>6}\t{display_line}");
            }
        }

        Ok(json!({
            "content": rendered,
            "totalLines": total_lines,
            "truncated": end < total_lines,
        }))
    }
}

/// `files.write`: atomically replaces a file's content, creating parent
/// directories as needed.
pub struct FilesWriteTool;

#[async_trait]
impl BuiltinTool for FilesWriteTool {
    fn id(&self) -> &'static str {
        "files.write"
    }

    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolFailure> {
        let path_str = required_str(&args, "path")?;
        let content = required_str(&args, "content")?;
        let allow_empty = args
            .get("allowEmpty")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if content.is_empty() && !allow_empty {
            return Err(ToolFailure::invalid_arguments(
                "content is empty; pass allowEmpty to write an empty file",
            ));
        }

        let path = Path::new(path_str);
        confine(&ctx.workspace, path, &file_extra_roots(&ctx.guardrails))?;

        if content.len() as u64 > ctx.guardrails.max_write_bytes {
            return Err(ToolFailure::content_too_large(ctx.guardrails.max_write_bytes));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolFailure::write_failed(e.to_string()))?;
        }

        let tmp_name = format!(
            "{}.tmp-{}",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("file"),
            uuid::Uuid::new_v4().simple()
        );
        let tmp_path = path.with_file_name(tmp_name);
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|e| ToolFailure::write_failed(e.to_string()))?;
        tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            ToolFailure::write_failed(e.to_string())
        })?;

        Ok(json!({ "bytesWritten": content.len() }))
    }
}

/// `files.edit`: in-place substring replacement.
///
/// When `all` is `false`, exactly the first occurrence is replaced — unlike
/// a uniqueness-enforcing editor, multiple matches are not an error here.
pub struct FilesEditTool;

#[async_trait]
impl BuiltinTool for FilesEditTool {
    fn id(&self) -> &'static str {
        "files.edit"
    }

    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolFailure> {
        let path_str = required_str(&args, "path")?;
        let search = required_str(&args, "search")?;
        let replace = required_str(&args, "replace")?;
        let all = args.get("all").and_then(Value::as_bool).unwrap_or(false);

        if search.is_empty() {
            return Err(ToolFailure::invalid_arguments("search must not be empty"));
        }

        let path = Path::new(path_str);
        confine(&ctx.workspace, path, &file_extra_roots(&ctx.guardrails))?;

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ToolFailure::read_failed(e.to_string()))?;

        let occurrences = content.matches(search).count();
        if occurrences == 0 {
            return Err(ToolFailure::search_not_found(path_str));
        }

        let (new_content, replacements) = if all {
            (content.replace(search, replace), occurrences)
        } else {
            (content.replacen(search, replace, 1), 1)
        };

        tokio::fs::write(path, &new_content)
            .await
            .map_err(|e| ToolFailure::write_failed(e.to_string()))?;

        Ok(json!({ "replacements": replacements }))
    }
}
