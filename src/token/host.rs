use crate::error::ResolveError;
use url::Url;

/// Host of a provider proxy endpoint such as
/// `https://012345678910.dkr.ecr.us-east-1.amazonaws.com`.
///
/// A non-empty `host_override` wins unconditionally.
pub fn resolve_host(endpoint: &str, host_override: Option<&str>) -> Result<String, ResolveError> {
    if let Some(forced) = non_empty(host_override) {
        return Ok(forced.to_string());
    }

    match url_host(endpoint)? {
        Some(host) => Ok(host),
        None => Err(invalid(endpoint, "endpoint has no host component".to_string())),
    }
}

/// Host of a directory entry's `serverAddress`.
///
/// Entries may be stored as full URLs, as `//host/path` network paths or as
/// bare `host[/path]` strings. When the parsed host is empty the path is used
/// instead, so a scheme-less entry resolves to the address as written.
pub fn resolve_entry_host(
    server_address: &str,
    host_override: Option<&str>,
) -> Result<String, ResolveError> {
    if let Some(forced) = non_empty(host_override) {
        return Ok(forced.to_string());
    }

    let address = server_address.trim();
    if address.is_empty() {
        return Err(invalid(server_address, "empty server address".to_string()));
    }

    if let Some(rest) = address.strip_prefix("//") {
        let host = authority(rest);
        if host.is_empty() {
            return Err(invalid(server_address, "network path has no host".to_string()));
        }
        return Ok(host.to_string());
    }

    if !address.contains("://") {
        // Relative reference: everything before a query or fragment is path.
        let path_end = address.find(['?', '#']).unwrap_or(address.len());
        return Ok(address[..path_end].to_string());
    }

    match url_host(address)? {
        Some(host) => Ok(host),
        None => {
            let url = Url::parse(address).map_err(|e| invalid(server_address, e.to_string()))?;
            Ok(url.path().to_string())
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

// Validated by `url`, but returned as written: no case folding and explicit
// ports (default ones included) stay part of the host.
fn url_host(address: &str) -> Result<Option<String>, ResolveError> {
    let url = Url::parse(address).map_err(|e| invalid(address, e.to_string()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Ok(None);
    }
    let rest = address.split_once("://").map_or(address, |(_, rest)| rest);
    Ok(Some(authority(rest).to_string()))
}

// `[user[:pass]@]host[:port]` up to the first path, query or fragment delimiter
fn authority(rest: &str) -> &str {
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    authority.rsplit_once('@').map_or(authority, |(_, host)| host)
}

fn invalid(endpoint: &str, reason: String) -> ResolveError {
    ResolveError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ECR_HOST: &str = "012345678910.dkr.ecr.us-east-1.amazonaws.com";

    #[test]
    fn test_resolve_host_from_endpoint() {
        let host = resolve_host(&format!("https://{}", ECR_HOST), None).unwrap();
        assert_eq!(host, ECR_HOST);
    }

    #[test]
    fn test_override_dominates() {
        for endpoint in ["https://a.example.com", "not a url", ""] {
            assert_eq!(resolve_host(endpoint, Some("forced.host")).unwrap(), "forced.host");
            assert_eq!(resolve_entry_host(endpoint, Some("forced.host")).unwrap(), "forced.host");
        }
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let host = resolve_host("https://registry.example.com", Some("")).unwrap();
        assert_eq!(host, "registry.example.com");
    }

    #[test]
    fn test_resolve_host_rejects_malformed_endpoint() {
        let err = resolve_host("::not-a-url", None).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidEndpoint { .. }));
        assert!(resolve_host("012345678910.dkr.ecr.us-east-1.amazonaws.com", None).is_err());
    }

    #[test]
    fn test_resolve_host_keeps_explicit_port() {
        let host = resolve_host("https://registry.local:5000/v2", None).unwrap();
        assert_eq!(host, "registry.local:5000");
    }

    #[test]
    fn test_entry_host_from_url_and_bare_address() {
        assert_eq!(resolve_entry_host(&format!("https://{}", ECR_HOST), None).unwrap(), ECR_HOST);
        assert_eq!(resolve_entry_host(ECR_HOST, None).unwrap(), ECR_HOST);
        assert_eq!(
            resolve_entry_host("registry.example.com/team", None).unwrap(),
            "registry.example.com/team"
        );
    }

    #[test]
    fn test_hosts_are_compared_as_written() {
        assert_eq!(
            resolve_entry_host("https://REG.example.com", None).unwrap(),
            "REG.example.com"
        );
        assert_eq!(resolve_entry_host("REG.example.com", None).unwrap(), "REG.example.com");
        assert_eq!(
            resolve_host("https://reg.example.com:443", None).unwrap(),
            "reg.example.com:443"
        );
        assert_eq!(
            resolve_entry_host("https://user:pw@reg.example.com:5000/v2", None).unwrap(),
            "reg.example.com:5000"
        );
    }

    #[test]
    fn test_entry_host_network_path() {
        assert_eq!(resolve_entry_host("//reg.example.com/x", None).unwrap(), "reg.example.com");
        assert_eq!(
            resolve_entry_host("//reg.example.com:5000", None).unwrap(),
            "reg.example.com:5000"
        );
        assert!(resolve_entry_host("///x", None).is_err());
    }

    #[test]
    fn test_entry_host_rejects_malformed_url() {
        assert!(resolve_entry_host("https://exa mple.com", None).is_err());
        assert!(resolve_entry_host("   ", None).is_err());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let once = resolve_entry_host(ECR_HOST, None).unwrap();
        let twice = resolve_entry_host(&once, None).unwrap();
        assert_eq!(once, twice);
    }
}
