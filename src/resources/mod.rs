/**
 * This module contains all logic for fetching raw model/texture bytes and for
 * normalizing source paths. Native targets read from the filesystem, WASM
 * targets fetch over HTTP from the hosting origin.
 */
pub mod texture;

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> reqwest::Url {
    let window = web_sys::window().unwrap();
    let location = window.location();
    let origin = location.origin().unwrap();
    let base = reqwest::Url::parse(&format!("{}/", origin)).unwrap();
    base.join(file_name).unwrap()
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name);
        reqwest::get(url).await?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = std::fs::read_to_string(file_name)?;

    Ok(txt)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name);
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = std::fs::read(file_name)?;

    Ok(data)
}

/// The file name of a path without its directory and extension.
///
/// Imports fall back to this as their display name when none is supplied.
pub fn file_stem_of(path: &str) -> &str {
    let file_name = path
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// The file extension of a path, if any.
pub fn extension_of(path: &str) -> Option<&str> {
    let file_name = path
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// The directory of a source path, with a guaranteed trailing separator and
/// duplicate separators collapsed to one. Relative texture slot paths are
/// resolved against this.
pub fn base_dir_of(path: &str) -> String {
    let normalized = normalize_separators(path);
    match normalized.rfind('/') {
        Some(idx) => normalized[..=idx].to_string(),
        None => "./".to_string(),
    }
}

/// Join a base directory and a relative path with exactly one separator.
pub fn join_path(base: &str, relative: &str) -> String {
    let mut joined = normalize_separators(base);
    if !joined.ends_with('/') {
        joined.push('/');
    }
    joined.push_str(normalize_separators(relative).trim_start_matches('/'));
    joined
}

fn normalize_separators(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut last_was_separator = false;
    for c in path.chars() {
        let is_separator = c == '/' || c == '\\';
        if !(is_separator && last_was_separator) {
            normalized.push(if is_separator { '/' } else { c });
        }
        last_was_separator = is_separator;
    }
    normalized
}
