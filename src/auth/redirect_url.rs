//! CAS login redirect URL construction
//!
//! Parameters are appended in a fixed order (service, renew, gateway,
//! method) so the same inputs always produce the same URL.

/// How boolean flags that are `false` are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagStyle {
    /// `renew`/`gateway` only appear when true
    #[default]
    OmitFalse,
    /// `renew=false` / `gateway=false` are written out
    Explicit,
}

/// Inputs for [`build_login_redirect_url`]
#[derive(Debug, Clone, Copy)]
pub struct LoginRedirect<'a> {
    pub login_url: &'a str,
    pub service_parameter_name: &'a str,
    pub service_url: &'a str,
    pub renew: bool,
    pub gateway: bool,
    pub method: Option<&'a str>,
    pub flag_style: FlagStyle,
}

/// Build the CAS login URL the browser is redirected to
pub fn build_login_redirect_url(redirect: &LoginRedirect<'_>) -> String {
    let separator = if redirect.login_url.contains('?') {
        '&'
    } else {
        '?'
    };

    let mut url = format!(
        "{}{}{}={}",
        redirect.login_url,
        separator,
        redirect.service_parameter_name,
        urlencoding::encode(redirect.service_url)
    );

    push_flag(&mut url, "renew", redirect.renew, redirect.flag_style);
    push_flag(&mut url, "gateway", redirect.gateway, redirect.flag_style);

    if let Some(method) = redirect.method.filter(|m| !m.trim().is_empty()) {
        url.push_str("&method=");
        url.push_str(&urlencoding::encode(method));
    }

    url
}

fn push_flag(url: &mut String, name: &str, value: bool, style: FlagStyle) {
    match (value, style) {
        (true, _) => {
            url.push_str(&format!("&{}=true", name));
        }
        (false, FlagStyle::Explicit) => {
            url.push_str(&format!("&{}=false", name));
        }
        (false, FlagStyle::OmitFalse) => {}
    }
}
