use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;
use crate::MorphologicalSource;

use super::{Prompt, PromptMetadata};

/// All prompts of one prompt set file.
///
/// The file is XML; every child of the root element is a prompt whose own
/// children carry its fields:
///
/// ```xml
/// <prompts>
///   <prompt>
///     <copyright>nitech</copyright>
///     <language>jp</language>
///     <content>atr503</content>
///     <style>normal</style>
///     <db>m001</db>
///     <id>a01</id>
///     <script>/漢字@かんじ/だよ</script>
///   </prompt>
/// </prompts>
/// ```
#[derive(Debug, Clone)]
pub struct PromptSet {
    name: String,
    prompts: Vec<Prompt>,
    truncated: bool,
}

#[derive(Default)]
struct RawPrompt {
    metadata: PromptMetadata,
    script: String,
}

impl RawPrompt {
    fn set_field(&mut self, field: &[u8], value: String) {
        let m = &mut self.metadata;
        match field {
            b"copyright" => m.copyright = value,
            b"language" => m.language = value,
            b"content" => m.content_type = value,
            b"style" => m.style = value,
            b"db" => m.voice_db = value,
            b"id" => m.id = value,
            b"script" => self.script = value,
            other => log::debug!(
                "Ignoring unknown prompt field <{}>",
                String::from_utf8_lossy(other)
            ),
        }
    }
}

impl PromptSet {
    /// Load a prompt set file. The set is named after the file stem.
    pub fn load<S: MorphologicalSource>(
        path: &Path,
        source: &S,
        max_prompts: usize,
    ) -> Result<Self> {
        let xml = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let set = Self::from_xml_str(&name, &xml, source, max_prompts)?;
        log::info!(
            "Loaded prompt set '{}' ({} prompts) from {}",
            set.name,
            set.prompts.len(),
            path.display()
        );
        Ok(set)
    }

    /// Parse a prompt set from XML text.
    ///
    /// Any prompt that fails to parse rejects the whole set. Prompts past
    /// `max_prompts` are dropped with a warning.
    pub fn from_xml_str<S: MorphologicalSource>(
        name: &str,
        xml: &str,
        source: &S,
        max_prompts: usize,
    ) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut prompts = Vec::new();
        let mut truncated = false;
        let mut depth = 0usize;
        let mut raw: Option<RawPrompt> = None;
        let mut field: Option<Vec<u8>> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    depth += 1;
                    match depth {
                        2 => raw = Some(RawPrompt::default()),
                        3 => field = Some(e.name().as_ref().to_vec()),
                        _ => {}
                    }
                }
                Event::Text(e) if depth == 3 => {
                    if let (Some(raw), Some(field)) = (raw.as_mut(), field.as_deref()) {
                        raw.set_field(field, e.unescape()?.into_owned());
                    }
                }
                Event::CData(e) if depth == 3 => {
                    if let (Some(raw), Some(field)) = (raw.as_mut(), field.as_deref()) {
                        raw.set_field(field, String::from_utf8_lossy(&e).into_owned());
                    }
                }
                Event::End(_) => {
                    match depth {
                        3 => field = None,
                        2 => {
                            if let Some(raw) = raw.take() {
                                if prompts.len() >= max_prompts {
                                    truncated = true;
                                    break;
                                }
                                prompts.push(Prompt::parse(raw.metadata, &raw.script, source)?);
                            }
                        }
                        _ => {}
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if truncated {
            log::warn!(
                "Prompt set '{}' holds more than {} prompts; the rest are ignored",
                name,
                max_prompts
            );
        }

        Ok(Self {
            name: name.to_string(),
            prompts,
            truncated,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Whether prompts were dropped for exceeding the limit.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn get(&self, id: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Morpheme, VoistError};

    /// Splits on `|`, tagging every piece as a noun.
    struct Pipes;

    impl MorphologicalSource for Pipes {
        fn tokenize(&self, text: &str) -> Result<Vec<Morpheme>> {
            Ok(text
                .split('|')
                .filter(|s| !s.is_empty())
                .map(|s| Morpheme::new(s, "名詞,一般,*,*"))
                .collect())
        }
    }

    const SET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<prompts>
  <prompt>
    <copyright>nitech</copyright>
    <language>jp</language>
    <content>atr503</content>
    <style>normal</style>
    <db>m001</db>
    <id>a01</id>
    <script>/漢字@かんじ/|だよ</script>
  </prompt>
  <prompt>
    <id>a02</id>
    <script>ねこ|です</script>
  </prompt>
  <prompt>
    <id>a03</id>
    <script>いぬ</script>
  </prompt>
</prompts>"#;

    #[test]
    fn reads_every_prompt_field() {
        let set = PromptSet::from_xml_str("atr503", SET, &Pipes, 100).unwrap();
        assert_eq!(set.name(), "atr503");
        assert_eq!(set.len(), 3);
        assert!(!set.is_truncated());

        let first = &set.prompts()[0];
        assert_eq!(first.metadata().voice_db, "m001");
        assert_eq!(first.metadata().content_type, "atr503");
        assert_eq!(first.tokens()[0].ruby, "かんじ");
        assert_eq!(set.get("a02").unwrap().text(), "ねこです");
    }

    #[test]
    fn truncates_at_prompt_limit() {
        let set = PromptSet::from_xml_str("atr503", SET, &Pipes, 2).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.is_truncated());
        assert!(set.get("a03").is_none());
    }

    #[test]
    fn one_bad_prompt_rejects_the_set() {
        let xml = "<prompts><prompt><id>x1</id><script>漢字</script></prompt></prompts>";
        let err = PromptSet::from_xml_str("bad", xml, &Pipes, 10).unwrap_err();
        assert!(matches!(err, VoistError::MalformedScript { ref id, .. } if id == "x1"));
    }

    #[test]
    fn missing_script_is_reported() {
        let xml = "<prompts><prompt><id>x1</id></prompt></prompts>";
        let err = PromptSet::from_xml_str("bad", xml, &Pipes, 10).unwrap_err();
        assert!(matches!(err, VoistError::MissingField("script")));
    }
}
