//! Starter content applied at creation time.
//!
//! Playground projects get a fixed file set per template; portfolios get a
//! starter section layout seeded into their home page.

use crate::db::models::NewFile;

/// Valid file kinds within a project tree.
pub const FILE_KINDS: &[&str] = &["file", "folder"];

/// Valid section kinds within a page.
pub const SECTION_KINDS: &[&str] = &["hero", "gallery", "text", "contact", "video"];

/// Template applied when a portfolio is created without one.
pub const DEFAULT_PORTFOLIO_TEMPLATE: &str = "minimal";

/// Theme applied when a portfolio is created without one.
pub fn default_theme() -> serde_json::Value {
    serde_json::json!({
        "colors": { "primary": "#2563eb", "background": "#ffffff" },
        "fonts": { "heading": "Inter", "body": "Inter" }
    })
}

/// Starter section layout for a portfolio template. Unknown templates fall
/// back to the minimal layout.
pub fn starter_sections(template: &str) -> &'static [&'static str] {
    match template {
        "creative" => &["hero", "gallery", "text", "video", "contact"],
        "tech" => &["hero", "text", "gallery", "contact"],
        "minimal" | "professional" | "architecture" | "fashion" => {
            &["hero", "gallery", "text", "contact"]
        }
        _ => &["hero", "gallery", "text", "contact"],
    }
}

fn file(project_id: i32, parent_id: Option<i32>, name: &str, path: &str, kind: &str, content: &str) -> NewFile {
    NewFile {
        project_id,
        parent_id,
        name: name.to_string(),
        path: path.to_string(),
        kind: kind.to_string(),
        content: content.to_string(),
    }
}

/// The fixed file set seeded into a new project of the given template.
/// Every template starts with a README; unknown templates get only that.
pub fn starter_files(template: &str, project_id: i32) -> Vec<NewFile> {
    let readme = file(
        project_id,
        None,
        "README.md",
        "/README.md",
        "file",
        &format!(
            "# {} Project\n\nThis is a new {} project created with DevStudio.",
            template, template
        ),
    );

    match template {
        "React App" => vec![
            readme,
            file(project_id, None, "src", "/src", "folder", ""),
            file(
                project_id,
                None,
                "App.js",
                "/src/App.js",
                "file",
                REACT_APP_JS,
            ),
            file(
                project_id,
                None,
                "App.css",
                "/src/App.css",
                "file",
                REACT_APP_CSS,
            ),
            file(
                project_id,
                None,
                "index.js",
                "/src/index.js",
                "file",
                REACT_INDEX_JS,
            ),
            file(
                project_id,
                None,
                "index.html",
                "/public/index.html",
                "file",
                REACT_INDEX_HTML,
            ),
            file(
                project_id,
                None,
                "package.json",
                "/package.json",
                "file",
                REACT_PACKAGE_JSON,
            ),
        ],
        "HTML/CSS/JS" => vec![
            readme,
            file(
                project_id,
                None,
                "index.html",
                "/index.html",
                "file",
                WEB_INDEX_HTML,
            ),
            file(
                project_id,
                None,
                "style.css",
                "/style.css",
                "file",
                WEB_STYLE_CSS,
            ),
            file(
                project_id,
                None,
                "script.js",
                "/script.js",
                "file",
                WEB_SCRIPT_JS,
            ),
        ],
        _ => vec![readme],
    }
}

const REACT_APP_JS: &str = r#"import React from 'react';
import './App.css';

function App() {
  return (
    <div className="App">
      <header className="App-header">
        <h1>Welcome to My Portfolio</h1>
        <p>
          Full-stack developer passionate about creating
          amazing web experiences.
        </p>
        <div className="skills">
          <span className="skill">React</span>
          <span className="skill">Node.js</span>
          <span className="skill">Python</span>
        </div>
      </header>
    </div>
  );
}

export default App;"#;

const REACT_APP_CSS: &str = r#".App {
  text-align: center;
}

.App-header {
  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
  padding: 60px 20px;
  color: white;
  min-height: 100vh;
  display: flex;
  flex-direction: column;
  align-items: center;
  justify-content: center;
}

.skills {
  display: flex;
  gap: 1rem;
  flex-wrap: wrap;
  justify-content: center;
}

.skill {
  background: rgba(255, 255, 255, 0.2);
  padding: 0.5rem 1rem;
  border-radius: 25px;
  font-size: 0.9rem;
}"#;

const REACT_INDEX_JS: &str = r#"import React from 'react';
import ReactDOM from 'react-dom/client';
import App from './App';

const root = ReactDOM.createRoot(document.getElementById('root'));
root.render(<App />);"#;

const REACT_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>React App</title>
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>"#;

const REACT_PACKAGE_JSON: &str = r#"{
  "name": "react-app",
  "version": "1.0.0",
  "dependencies": {
    "react": "^18.2.0",
    "react-dom": "^18.2.0"
  },
  "scripts": {
    "start": "react-scripts start",
    "build": "react-scripts build"
  }
}"#;

const WEB_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>My Web Project</title>
    <link rel="stylesheet" href="style.css">
</head>
<body>
    <div class="container">
        <h1>Welcome to My Web Project</h1>
        <p>This is a simple HTML, CSS, and JavaScript project.</p>
        <button onclick="showMessage()">Click me!</button>
    </div>
    <script src="script.js"></script>
</body>
</html>"#;

const WEB_STYLE_CSS: &str = r#"body {
    font-family: Arial, sans-serif;
    margin: 0;
    padding: 0;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    color: white;
    min-height: 100vh;
    display: flex;
    align-items: center;
    justify-content: center;
}

.container {
    text-align: center;
    padding: 2rem;
    background: rgba(255, 255, 255, 0.1);
    border-radius: 15px;
}

button {
    background: rgba(255, 255, 255, 0.2);
    border: none;
    padding: 1rem 2rem;
    border-radius: 25px;
    color: white;
    font-size: 1rem;
    cursor: pointer;
}"#;

const WEB_SCRIPT_JS: &str = r#"function showMessage() {
    alert('Hello from DevStudio!');
}

document.addEventListener('DOMContentLoaded', function() {
    console.log('Web project loaded successfully!');
});"#;
