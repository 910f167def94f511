use std::io::{Cursor, Read};

use reqwest::Client;

use super::error::{UpstreamError, UpstreamResult};
use crate::models::ExtractedSubtitle;

/// 识别为字幕文本的成员扩展名
pub const SUBTITLE_EXTENSIONS: &[&str] = &[".srt", ".sub", ".ssa", ".ass", ".vtt", ".txt"];

/// 压缩包下载上限
pub const MAX_ARCHIVE_BYTES: usize = 8 * 1024 * 1024;

/// 单个字幕成员解压上限
pub const MAX_MEMBER_BYTES: u64 = 4 * 1024 * 1024;

/// 字幕压缩包下载与解压
#[derive(Clone)]
pub struct ArchiveFetcher {
    client: Client,
}

impl ArchiveFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 下载压缩包并解出第一个字幕成员
    pub async fn fetch(&self, download_url: &str) -> UpstreamResult<ExtractedSubtitle> {
        let mut response = self.client.get(download_url).send().await?;
        if !response.status().is_success() {
            return Err(UpstreamError::HttpStatus(response.status().as_u16()));
        }

        if let Some(length) = response.content_length() {
            if length > MAX_ARCHIVE_BYTES as u64 {
                return Err(UpstreamError::TooLarge {
                    limit: MAX_ARCHIVE_BYTES as u64,
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > MAX_ARCHIVE_BYTES {
                return Err(UpstreamError::TooLarge {
                    limit: MAX_ARCHIVE_BYTES as u64,
                });
            }
            body.extend_from_slice(&chunk);
        }

        tokio::task::spawn_blocking(move || extract_subtitle(&body)).await?
    }
}

/// 线性扫描压缩包成员，返回第一个字幕文本
pub fn extract_subtitle(archive_bytes: &[u8]) -> UpstreamResult<ExtractedSubtitle> {
    extract_subtitle_limited(archive_bytes, MAX_MEMBER_BYTES)
}

fn extract_subtitle_limited(
    archive_bytes: &[u8],
    member_limit: u64,
) -> UpstreamResult<ExtractedSubtitle> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let lower = name.to_ascii_lowercase();
        if !SUBTITLE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            continue;
        }

        // 声明的大小不可信，读取时再截一次
        if entry.size() > member_limit {
            return Err(UpstreamError::TooLarge { limit: member_limit });
        }
        let mut raw = Vec::new();
        entry.by_ref().take(member_limit + 1).read_to_end(&mut raw)?;
        if raw.len() as u64 > member_limit {
            return Err(UpstreamError::TooLarge { limit: member_limit });
        }
        let member_name = name.rsplit('/').next().unwrap_or(&name).to_string();

        return Ok(ExtractedSubtitle {
            member_name,
            text: decode_text(&raw),
        });
    }

    Err(UpstreamError::NoSubtitleMember)
}

/// UTF-8 解码，失败时按 Latin-1 逐字节解码
pub fn decode_text(raw: &[u8]) -> String {
    let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
    match std::str::from_utf8(raw) {
        Ok(text) => text.to_string(),
        Err(_) => raw.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    fn build_zip(members: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in members {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extracts_first_subtitle_member() {
        let archive = build_zip(&[
            ("readme.nfo", "release notes"),
            ("subs/", ""),
            ("subs/Titanic.1997.SLO.srt", "1\n00:00:01,000 --> 00:00:02,000\nŽivjo\n"),
            ("Titanic.other.srt", "2\n"),
        ]);

        let extracted = extract_subtitle(&archive).unwrap();
        assert_eq!(extracted.member_name, "Titanic.1997.SLO.srt");
        assert!(extracted.text.starts_with("1\n"));
    }

    #[test]
    fn test_archive_without_subtitle_member() {
        let archive = build_zip(&[("readme.nfo", "nothing here")]);
        assert!(matches!(
            extract_subtitle(&archive),
            Err(UpstreamError::NoSubtitleMember)
        ));
    }

    #[test]
    fn test_malformed_archive() {
        let result = extract_subtitle(b"<html>Too many requests</html>");
        assert!(matches!(result, Err(UpstreamError::Archive(_))));
    }

    #[test]
    fn test_oversized_member_is_rejected() {
        let big = "1\n".repeat(64);
        let archive = build_zip(&[("movie.srt", big.as_str())]);

        assert!(matches!(
            extract_subtitle_limited(&archive, 16),
            Err(UpstreamError::TooLarge { limit: 16 })
        ));
        assert_eq!(
            extract_subtitle_limited(&archive, big.len() as u64).unwrap().text,
            big
        );
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // 非法 UTF-8 按字节映射到 U+0000..U+00FF
        let raw = [0xC8, 0x61, 0x9A, 0x61];
        assert_eq!(decode_text(&raw), "\u{C8}a\u{9A}a");
        assert_eq!(decode_text(&[0xE8, 0x20, 0xFF]), "è ÿ");

        assert_eq!(decode_text(b"\xEF\xBB\xBF1\nHi"), "1\nHi");
        assert_eq!(decode_text("žabe".as_bytes()), "žabe");
    }

    proptest! {
        #[test]
        fn prop_utf8_text_round_trips(text in "\\PC*") {
            let archive = build_zip(&[("movie.srt", text.as_str())]);
            let extracted = extract_subtitle(&archive).unwrap();
            prop_assert_eq!(extracted.text, text);
        }
    }
}
