pub const GENERIC_AUTH_ERROR: &str = "Something went wrong. Please try again.";

/// User-facing text for a provider error code. The `auth/` prefix is
/// optional; unknown codes fall back to [`GENERIC_AUTH_ERROR`].
#[must_use]
pub fn message_for_code(code: &str) -> &'static str {
    let code = code.trim();
    let code = code.strip_prefix("auth/").unwrap_or(code);
    match code {
        "email-already-in-use" => "An account with this email already exists",
        "invalid-email" => "Please enter a valid email address",
        "weak-password" => "Password must be at least 6 characters",
        "user-not-found" => "No account found with this email",
        "wrong-password" => "Incorrect password",
        "invalid-credential" => "Invalid email or password",
        "too-many-requests" => "Too many attempts. Please try again later",
        "network-request-failed" => "Network error. Please check your connection",
        "user-disabled" => "This account has been disabled",
        _ => GENERIC_AUTH_ERROR,
    }
}
