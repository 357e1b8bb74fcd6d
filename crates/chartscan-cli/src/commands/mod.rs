//! CLI 명령어 구현 모듈.

pub mod changes;
pub mod decide;
pub mod pixels;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// JSON 파일을 읽어 역직렬화합니다.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse JSON input: {}", path.display()))
}
