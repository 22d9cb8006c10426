//! Input validation (§6): branch names and repository URLs, enforced at the HTTP
//! boundary before any clone is attempted (§8 scenario 4 "hostile branch").

/// Why a branch name or URL was rejected. The message is safe to surface to a client
/// (no internal paths or stack traces).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("branch name invalid: {0}")]
    Branch(String),

    #[error("repository url invalid: {0}")]
    RepoUrl(String),
}

const SHELL_METACHARACTERS: &[char] = &[
    ';', '|', '&', '$', '`', '<', '>', '(', ')', '{', '}', '[', ']', '\\', '"', '\'',
];

/// Validates a branch name per §6: `^[A-Za-z0-9/_.-]+$`, length ≤ 200, no leading/trailing
/// `.` or `/`, no `//`, no trailing `.lock`.
pub fn validate_branch(branch: &str) -> Result<(), ValidationError> {
    if branch.is_empty() || branch.len() > 200 {
        return Err(ValidationError::Branch("length out of bounds".to_string()));
    }
    if !branch
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "/_.-".contains(c))
    {
        return Err(ValidationError::Branch(
            "contains characters outside [A-Za-z0-9/_.-]".to_string(),
        ));
    }
    if branch.starts_with('.')
        || branch.starts_with('/')
        || branch.ends_with('.')
        || branch.ends_with('/')
    {
        return Err(ValidationError::Branch(
            "leading/trailing '.' or '/'".to_string(),
        ));
    }
    if branch.contains("//") {
        return Err(ValidationError::Branch("contains '//'".to_string()));
    }
    if branch.ends_with(".lock") {
        return Err(ValidationError::Branch("trailing '.lock'".to_string()));
    }
    Ok(())
}

/// Validates a repository URL per §6: must begin with `https://`, `git@`, or `ssh://`;
/// must not contain shell metacharacters; `file://`, `javascript:`, `data:` are rejected.
pub fn validate_repo_url(url: &str) -> Result<(), ValidationError> {
    let lower = url.to_lowercase();
    for rejected in ["file://", "javascript:", "data:"] {
        if lower.starts_with(rejected) {
            return Err(ValidationError::RepoUrl(format!(
                "scheme {rejected} is rejected"
            )));
        }
    }
    let allowed_prefix =
        url.starts_with("https://") || url.starts_with("git@") || url.starts_with("ssh://");
    if !allowed_prefix {
        return Err(ValidationError::RepoUrl(
            "must begin with https://, git@, or ssh://".to_string(),
        ));
    }
    if url.chars().any(|c| SHELL_METACHARACTERS.contains(&c)) {
        return Err(ValidationError::RepoUrl(
            "contains shell metacharacters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_branch() {
        assert!(validate_branch("feature/add-tests").is_ok());
    }

    #[test]
    fn rejects_hostile_branch() {
        assert!(validate_branch("main; rm -rf /").is_err());
    }

    #[test]
    fn rejects_leading_dot() {
        assert!(validate_branch(".hidden").is_err());
    }

    #[test]
    fn rejects_double_slash() {
        assert!(validate_branch("a//b").is_err());
    }

    #[test]
    fn rejects_lock_suffix() {
        assert!(validate_branch("main.lock").is_err());
    }

    #[test]
    fn accepts_https_url() {
        assert!(validate_repo_url("https://github.com/acme/pay").is_ok());
    }

    #[test]
    fn accepts_ssh_url() {
        assert!(validate_repo_url("git@github.com:acme/pay.git").is_ok());
    }

    #[test]
    fn rejects_file_scheme() {
        assert!(validate_repo_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn rejects_shell_metacharacters() {
        assert!(validate_repo_url("https://github.com/acme/pay; rm -rf /").is_err());
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(validate_repo_url("ftp://example.com/repo").is_err());
    }
}
