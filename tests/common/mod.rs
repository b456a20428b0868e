//! PDF fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream, dictionary};

const OWNER_PASSWORD: &str = "owner-only-Kq7!";

/// A document with `pages` text pages and a trailer ID (needed to encrypt).
pub fn build_pdf(pages: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String((1u8..=16).collect(), lopdf::StringFormat::Literal),
            Object::String((1u8..=16).rev().collect(), lopdf::StringFormat::Literal),
        ]),
    );

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica"
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) }
    });

    let mut kids = Vec::with_capacity(pages);
    for n in 1..=pages {
        let content = format!("BT\n/F1 12 Tf\n100 700 Td\n(Page {n}) Tj\nET\n");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Resources" => Object::Reference(resources_id),
            "Contents" => Object::Reference(content_id)
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id)
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

/// Write a document protected by `user_password` (RC4, 128-bit).
pub fn write_encrypted(dir: &Path, name: &str, user_password: &str, pages: usize) -> PathBuf {
    let mut doc = build_pdf(pages);
    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password: OWNER_PASSWORD,
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).unwrap();
    doc.encrypt(&state).unwrap();

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Write a document with an owner password only; anyone may open it.
pub fn write_owner_only(dir: &Path, name: &str, pages: usize) -> PathBuf {
    write_encrypted(dir, name, "", pages)
}

/// Decoded content stream of page `page` (1-based) of an unencrypted file.
pub fn page_content(path: &Path, page: u32) -> Vec<u8> {
    let doc = Document::load(path).unwrap();
    let page_id = doc.get_pages()[&page];
    doc.get_page_content(page_id).unwrap()
}

/// Whether `haystack` contains `needle` as a contiguous run.
pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

pub fn write_plain(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let mut doc = build_pdf(pages);
    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

pub fn write_garbage(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"this is not a pdf at all").unwrap();
    path
}
