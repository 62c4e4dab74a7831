use std::io;
use std::path::Path;

// Read the template document from disk on every request, so template edits
// take effect without a restart.
pub async fn load(path: &Path) -> io::Result<String> {
    tokio::fs::read_to_string(path).await
}

// Substitute the requirement into the fixed instruction scaffold and append
// the reference template. The scaffold pins down output shape: only the
// generated prompt's code block, author names replaced with "AI".
pub fn build_prompt(template: &str, requirement: &str) -> String {
    format!(
        "参考以下的 prompt，为 \"{requirement}\" 创建 prompt：\n\n\
         注意：\n\
         1. 作者都设置为 AI\n\
         2. 结果只要 prompt 本身所在的代码块，不做其他任何解释\n\
         3. 如果出现人名，则替换为 AI\n\
         \n{template}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_requirement_and_template() {
        let prompt = build_prompt("# Role: 诗人\n", "写一首诗");
        assert!(prompt.contains("为 \"写一首诗\" 创建 prompt"));
        assert!(prompt.ends_with("# Role: 诗人\n"));
    }

    #[test]
    fn scaffold_precedes_template() {
        let prompt = build_prompt("TEMPLATE", "写一首诗");
        let scaffold_at = prompt.find("注意：").unwrap();
        let template_at = prompt.find("TEMPLATE").unwrap();
        assert!(scaffold_at < template_at);
    }

    #[tokio::test]
    async fn load_reads_the_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.md");
        std::fs::write(&path, "# Role: 诗人\n").unwrap();

        let template = load(&path).await.unwrap();
        assert_eq!(template, "# Role: 诗人\n");
    }

    #[tokio::test]
    async fn load_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.md");
        assert!(load(&missing).await.is_err());
    }
}
