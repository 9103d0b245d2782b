//! Built-in demo page, loaded when no markup file is given

/// A small landing page with a hero card, feature grid and stats band
pub const DEMO_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Preview Demo</title>
  <style>
    body { font-family: system-ui, sans-serif; }
    .card { background: white; border-radius: 16px; }
  </style>
</head>
<body style="background-color: rgb(245, 243, 255); padding: 32px">
  <main class="container">
    <section id="hero" class="card primary" style="padding: 32px; border-radius: 16px; box-shadow: 0 10px 30px rgba(0, 0, 0, 0.1)">
      <div class="brand" style="width: 64px; height: 64px; color: rgb(255, 255, 255)">L</div>
      <h1 class="title" style="color: rgb(124, 58, 237)">Lens Preview</h1>
      <p class="subtitle" style="line-height: 1.6">Interactive markup preview with element inspection.</p>
      <div class="actions" style="display: flex">
        <button id="start" class="btn btn-primary" style="padding: 12px 24px; border-radius: 8px">Get Started</button>
        <a id="docs" class="btn btn-secondary" href="https://example.com/docs">Read the docs</a>
      </div>
    </section>
    <section id="features" class="grid" style="display: grid">
      <article class="feature"><svg class="icon" viewBox="0 0 24 24"><path d="M13 10V3L4 14h7v7l9-11h-7z"/></svg><h3>Fast</h3><p>Documents load in a fresh sandbox every time.</p></article>
      <article class="feature"><h3>Isolated</h3><p>The preview shares no memory with the host.</p></article>
      <article class="feature"><h3>Inspectable</h3><p>Click anything to capture its styles.</p></article>
    </section>
    <footer id="stats" class="stats" style="text-align: center">
      <div class="stat"><strong>10k+</strong> users</div>
      <div class="stat"><strong>99.9%</strong> uptime</div>
    </footer>
  </main>
</body>
</html>
"##;
