/// GET / — liveness probe for the hosting platform.
pub async fn root() -> &'static str {
    "ok"
}

/// GET /healthz — same probe under a conventional path.
pub async fn healthz() -> &'static str {
    "ok"
}
