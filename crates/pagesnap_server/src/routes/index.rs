use axum::{extract::State, response::Html, Json};
use serde::Serialize;

use crate::app::AppState;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>pagesnap</title>
</head>
<body>
<h1>pagesnap</h1>
<form id="capture">
  <input id="url" type="url" placeholder="https://example.com" required size="60">
  <button type="submit">Capture</button>
</form>
<p id="status"></p>
<ul id="pages"></ul>
<script>
async function loadPages() {
  const pages = await (await fetch('/api/cloned-pages')).json();
  const list = document.getElementById('pages');
  list.replaceChildren(...pages.map(p => {
    const li = document.createElement('li');
    const link = document.createElement('a');
    link.href = p.files.simple;
    link.textContent = p.title;
    li.append(link, ' ', p.url, ' ', p.timestamp);
    return li;
  }));
}
document.getElementById('capture').addEventListener('submit', async e => {
  e.preventDefault();
  const status = document.getElementById('status');
  status.textContent = 'Capturing...';
  const res = await fetch('/api/clone', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ url: document.getElementById('url').value })
  });
  const body = await res.json();
  status.textContent = body.success ? 'Saved: ' + body.title : 'Failed: ' + body.error;
  loadPages();
});
loadPages();
</script>
</body>
</html>
"#;

/// `GET /`
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    success: bool,
    status: &'static str,
    version: &'static str,
    archive_root: String,
    bind: String,
    public_prefix: String,
}

/// `GET /api/info`
pub async fn info_handler(State(state): State<AppState>) -> Json<InfoResponse> {
    let config = &state.config;
    Json(InfoResponse {
        success: true,
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
        archive_root: config.archive_root.display().to_string(),
        bind: config.bind.clone(),
        public_prefix: config.route_prefix().to_string(),
    })
}
