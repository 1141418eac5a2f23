use reqwest::Url;

/// # Errors
///
/// Will return `Err` if the value is not an absolute http(s) url
pub fn check_remote_url(value: &str) -> Result<String, String> {
    let url = Url::parse(value).map_err(|e| format!("The remote url '{value}' is not valid: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(value.trim_end_matches('/').to_string()),
        other => Err(format!(
            "The remote url '{value}' uses scheme '{other}', expected http or https."
        )),
    }
}
