//! Digest page template.

/// Marker replaced by the concatenated record fragments.
pub const CONTENTS_PLACEHOLDER: &str = "{contents}";

/// Email subject and page title.
pub const DIGEST_TITLE: &str = "Azure 更新情報";

/// Outer page, with a single [`CONTENTS_PLACEHOLDER`].
pub const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
  <meta charset="UTF-8">
  <title>Azure 更新情報</title>
  <style>
    body {
      font-family: Noto Sans JP;
      font-size: 1.0em;
      margin: 40px;
      background: #fff;
      color: #222;
    }
    .content {
      font-family: Noto Sans JP;
      font-size: 1.0em;
      padding: 22px 28px;
      border-radius: 10px;
      box-shadow: 0 2px 8px #0001;
      margin-bottom: 32px;
    }
    .title {
      background: #f9f9fb;
      font-family: Noto Sans JP;
      font-size: 1.2em;
      font-weight: bold;
      margin-bottom: 12px;
    }
    .label {
      font-size: 1.0em;
      font-family: Noto Sans JP;
      display: inline-block;
      background: #e6f2fb;
      color: #003366;
      border-radius: 8px;
      padding: 6px 8px;
      font-weight: 500;
      margin-bottom: 12px;
    }
    .description {
      font-family: Noto Sans JP;
      font-size: 1.0em;
      margin-bottom: 12px;
    }
    .footer {
      font-family: Noto Sans JP;
      font-size: 1.0em;
      border-radius: 2px;
      font-weight: 500;
      letter-spacing: 0.03em;
    }
  </style>
</head>
<body>
  {contents}
</body>
</html>
"#;

/// Substitute `contents` into the page template.
#[must_use]
pub fn fill_page(contents: &str) -> String {
    PAGE_TEMPLATE.replacen(CONTENTS_PLACEHOLDER, contents, 1)
}
