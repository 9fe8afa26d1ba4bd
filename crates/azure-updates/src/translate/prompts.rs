//! Fixed system prompts for Japanese translation.

/// Status labels that may prefix a title, and their Japanese forms.
pub const TITLE_LABELS: &[(&str, &str)] = &[
    ("General Availability:", "一般提供："),
    ("Launched:", "一般提供："),
    ("In preview:", "パブリックプレビュー："),
    ("Public Preview:", "パブリックプレビュー："),
    ("Private Preview:", "プライベートプレビュー："),
    ("Retirement:", "リタイアメント："),
];

/// Font family Latin-script fonts are rewritten to.
pub const TARGET_FONT_FAMILY: &str = "Noto Sans JP";

/// Build the title system prompt from [`TITLE_LABELS`].
#[must_use]
pub fn title_prompt() -> String {
    let labels = TITLE_LABELS
        .iter()
        .map(|(en, ja)| format!("{en} {ja}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "入力された英文を日本語に翻訳して下さい。\
         先頭のラベルは、次のように翻訳してください。{labels}"
    )
}

/// Build the description system prompt.
#[must_use]
pub fn description_prompt() -> String {
    format!(
        "HTML書式で入力された文書の一部を日本語に翻訳して下さい。\
         文書は <div> タグで開始して、</div> タグで終了してください。\
         文書中に lang='EN-US' の属性がある場合は lang='JA-JP' に変更してください。\
         font-family: Arial; や font-family: Times New Roman; のような英文フォントの属性は \
         font-family: {TARGET_FONT_FAMILY}; に変更してください。\
         それ以外の style 属性やタグ記述は、既存のままオリジナルの HTML書式を保持してください。"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_prompt_lists_every_label() {
        let prompt = title_prompt();
        for (en, ja) in TITLE_LABELS {
            assert!(prompt.contains(&format!("{en} {ja}")), "missing {en}");
        }
    }

    #[test]
    fn test_description_prompt_rules() {
        let prompt = description_prompt();
        assert!(prompt.contains("lang='JA-JP'"));
        assert!(prompt.contains("font-family: Noto Sans JP;"));
        assert!(prompt.contains("<div>"));
    }
}
