//! Inline pages
//!
//! The UI is three small server-embedded pages. Everything dynamic goes
//! through the JSON API via fetch; the HTML itself is static.

use axum::response::{Html, Redirect};

pub async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

pub async fn register_page() -> Html<&'static str> {
    Html(REGISTER_HTML)
}

// The markup contains `"#` (the sign-out anchor), so the wider delimiter is
// required.
const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>AgentDesk</title>
<style>
body { font-family: system-ui, sans-serif; margin: 0; display: flex; height: 100vh; }
#sidebar { width: 280px; border-right: 1px solid #ddd; overflow-y: auto; padding: 1rem; }
#sidebar h1 { font-size: 1.1rem; }
#sidebar button { display: block; width: 100%; text-align: left; margin: 0.25rem 0; padding: 0.5rem; border: 1px solid #ccc; border-radius: 6px; background: #fff; cursor: pointer; }
#sidebar button.active { background: #1a73e8; color: #fff; border-color: #1a73e8; }
#main { flex: 1; display: flex; flex-direction: column; }
#messages { flex: 1; overflow-y: auto; padding: 1rem; }
.msg { max-width: 70%; margin: 0.4rem 0; padding: 0.6rem 0.8rem; border-radius: 10px; white-space: pre-wrap; }
.msg.user { background: #1a73e8; color: #fff; margin-left: auto; }
.msg.assistant { background: #f1f3f4; }
#composer { display: flex; gap: 0.5rem; padding: 1rem; border-top: 1px solid #ddd; }
#prompt { flex: 1; padding: 0.6rem; border: 1px solid #ccc; border-radius: 6px; }
#send { padding: 0.6rem 1.2rem; border: none; border-radius: 6px; background: #1a73e8; color: #fff; cursor: pointer; }
#logout { float: right; font-size: 0.8rem; }
</style>
</head>
<body>
<div id="sidebar">
  <h1>AgentDesk <a id="logout" href="#">sign out</a></h1>
  <div id="agents"></div>
</div>
<div id="main">
  <div id="messages"></div>
  <form id="composer">
    <input id="prompt" autocomplete="off" placeholder="Ask something...">
    <button id="send" type="submit">Send</button>
  </form>
</div>
<script>
let agentId = null;

function addMessage(role, text) {
  const div = document.createElement('div');
  div.className = 'msg ' + role;
  div.textContent = text;
  document.getElementById('messages').appendChild(div);
  div.scrollIntoView();
}

async function loadAgents() {
  const res = await fetch('/api/agents');
  const body = await res.json();
  const box = document.getElementById('agents');
  for (const agent of body.agents) {
    const btn = document.createElement('button');
    btn.textContent = agent.name;
    btn.title = agent.description;
    btn.onclick = () => {
      agentId = agent.id;
      document.querySelectorAll('#agents button').forEach(b => b.classList.remove('active'));
      btn.classList.add('active');
      document.getElementById('messages').innerHTML = '';
    };
    box.appendChild(btn);
  }
}

document.getElementById('composer').addEventListener('submit', async (e) => {
  e.preventDefault();
  const input = document.getElementById('prompt');
  const prompt = input.value.trim();
  if (!prompt || !agentId) return;
  input.value = '';
  addMessage('user', prompt);
  const res = await fetch('/api/chat', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ prompt, agentId }),
  });
  const body = await res.json();
  addMessage('assistant', res.ok ? body.reply : body.message);
});

document.getElementById('logout').addEventListener('click', async (e) => {
  e.preventDefault();
  await fetch('/api/auth/logout', { method: 'POST' });
  window.location = '/login';
});

loadAgents();
</script>
</body>
</html>
"##;

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Sign in</title>
<style>
body { font-family: system-ui, sans-serif; display: flex; align-items: center; justify-content: center; height: 100vh; margin: 0; }
form { width: 320px; display: flex; flex-direction: column; gap: 0.6rem; }
input { padding: 0.6rem; border: 1px solid #ccc; border-radius: 6px; }
button { padding: 0.6rem; border: none; border-radius: 6px; background: #1a73e8; color: #fff; cursor: pointer; }
#error { color: #c5221f; font-size: 0.9rem; min-height: 1.2rem; }
</style>
</head>
<body>
<form id="form">
  <h1>Sign in</h1>
  <input id="email" type="email" placeholder="Email" required>
  <input id="password" type="password" placeholder="Password" required>
  <button type="submit">Sign in</button>
  <div id="error"></div>
  <a href="/register">Create an account</a>
</form>
<script>
document.getElementById('form').addEventListener('submit', async (e) => {
  e.preventDefault();
  const res = await fetch('/api/auth/login', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({
      email: document.getElementById('email').value,
      password: document.getElementById('password').value,
    }),
  });
  if (res.ok) {
    window.location = '/dashboard';
  } else {
    const body = await res.json();
    document.getElementById('error').textContent = body.message;
  }
});
</script>
</body>
</html>
"#;

const REGISTER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Create account</title>
<style>
body { font-family: system-ui, sans-serif; display: flex; align-items: center; justify-content: center; height: 100vh; margin: 0; }
form { width: 320px; display: flex; flex-direction: column; gap: 0.6rem; }
input { padding: 0.6rem; border: 1px solid #ccc; border-radius: 6px; }
button { padding: 0.6rem; border: none; border-radius: 6px; background: #1a73e8; color: #fff; cursor: pointer; }
#error { color: #c5221f; font-size: 0.9rem; min-height: 1.2rem; }
</style>
</head>
<body>
<form id="form">
  <h1>Create account</h1>
  <input id="email" type="email" placeholder="Email" required>
  <input id="password" type="password" placeholder="Password" required>
  <button type="submit">Register</button>
  <div id="error"></div>
  <a href="/login">Already have an account? Sign in</a>
</form>
<script>
document.getElementById('form').addEventListener('submit', async (e) => {
  e.preventDefault();
  const res = await fetch('/api/auth/register', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({
      email: document.getElementById('email').value,
      password: document.getElementById('password').value,
    }),
  });
  if (res.ok) {
    window.location = '/dashboard';
  } else {
    const body = await res.json();
    document.getElementById('error').textContent = body.message;
  }
});
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    // Each page must be one complete document; the dashboard markup includes
    // the sign-out anchor, whose href once clipped the constant short.
    #[test]
    fn test_pages_are_complete_documents() {
        for page in [DASHBOARD_HTML, LOGIN_HTML, REGISTER_HTML] {
            assert!(page.starts_with("<!DOCTYPE html>"));
            assert!(page.trim_end().ends_with("</html>"));
        }
        assert!(DASHBOARD_HTML.contains(r##"<a id="logout" href="#">sign out</a>"##));
        assert!(DASHBOARD_HTML.contains("fetch('/api/chat'"));
    }
}
