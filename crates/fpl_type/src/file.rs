use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use ahash::AHasher;

use crate::{BytePosition, Id, Store, span::Span};

pub type FileId = Id<SourceFile>;

#[derive(Default, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SourceFile {
  pub path: PathBuf,
  /// Name used in diagnostics: the file name without its directory.
  pub name: String,
  pub text: String,
  pub line_starts: Vec<BytePosition>,
  pub hash: u64,
}

impl SourceFile {
  pub fn new(
    path: PathBuf,
    text: String,
  ) -> Self {
    let line_starts = compute_line_starts(&text);
    let hash = text_hash(&text);
    let name = display_name(&path);
    Self {
      path,
      name,
      text,
      line_starts,
      hash,
    }
  }

  #[inline]
  pub fn len_bytes(&self) -> u32 {
    self.text.len() as u32
  }

  /// `name` without the `.fpl` extension; names the file node in tree dumps.
  pub fn module_name(&self) -> &str {
    self.name.strip_suffix(".fpl").unwrap_or(&self.name)
  }
}

pub struct SourceMap {
  files: Store<SourceFile>,
  by_path: HashMap<PathBuf, FileId>,
}

impl Default for SourceMap {
  fn default() -> Self {
    Self::new()
  }
}

impl SourceMap {
  pub fn new() -> Self {
    Self {
      files: Store::new(),
      by_path: HashMap::new(),
    }
  }

  pub fn add_file<P: Into<PathBuf>>(
    &mut self,
    path: P,
    text: String,
  ) -> FileId {
    let path = normalize_path(path.into());

    if let Some(id) = self.by_path.get(&path) {
      return *id;
    }

    let id = self.files.alloc(SourceFile::new(path.clone(), text));
    self.by_path.insert(path, id);
    id
  }

  #[inline]
  pub fn get(
    &self,
    id: &FileId,
  ) -> &SourceFile {
    self.files.get(id)
  }

  pub fn len(&self) -> usize {
    self.files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
    self.files.iter()
  }

  /// 1-based line and column (in chars) of `pos`.
  pub fn line_col(
    &self,
    file: &FileId,
    pos: BytePosition,
  ) -> (u32, u32) {
    let f = self.get(file);
    let pos = BytePosition(pos.0.min(f.len_bytes()));
    let line = upper_bound_line(&f.line_starts, pos);
    let line_start = f.line_starts[line].0 as usize;
    let slice = &f.text.as_bytes()[line_start..pos.0 as usize];
    let col = unicode_column(slice);

    ((line as u32) + 1, (col as u32) + 1)
  }

  /// `name:firstLine.firstCol-lastLine.lastCol`, the last column being the
  /// column of the final character of the span.
  pub fn location(
    &self,
    span: &Span,
  ) -> String {
    let f = self.get(&span.file);
    let (first_line, first_col) = self.line_col(&span.file, span.start);
    let last = match f.text.get(span.start.0 as usize..span.end.0 as usize) {
      Some(text) if !text.is_empty() => {
        let offset = text.char_indices().last().map(|(i, _)| i).unwrap_or(0);
        BytePosition(span.start.0 + offset as u32)
      },
      _ => span.start,
    };
    let (last_line, last_col) = self.line_col(&span.file, last);
    format!("{}:{}.{}-{}.{}", f.name, first_line, first_col, last_line, last_col)
  }

  pub fn slice(
    &self,
    span: &Span,
  ) -> &str {
    let f = self.get(&span.file);
    &f.text[span.start.0 as usize..span.end.0 as usize]
  }

  pub fn snippet(
    &self,
    span: &Span,
  ) -> String {
    let (line, col) = self.line_col(&span.file, span.start);
    let f = self.get(&span.file);
    let line_idx = (line - 1) as usize;
    let line_start = f.line_starts[line_idx].0 as usize;
    let line_end = f
      .line_starts
      .get(line_idx + 1)
      .map(|p| p.0 as usize)
      .unwrap_or_else(|| f.text.len());

    let line_str = f.text[line_start..line_end].trim_end_matches(&['\r', '\n'][..]);
    let caret = " ".repeat((col - 1) as usize) + &"^".repeat(span.len().max(1));

    format!("{:>4} | {}\n     | {}", line, line_str, caret)
  }
}

/// Canonicalize when the file exists; otherwise keep the path as given.
pub fn normalize_path(mut p: PathBuf) -> PathBuf {
  if let Ok(c) = p.canonicalize() {
    p = c;
  }
  p
}

fn display_name(path: &Path) -> String {
  path.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

fn compute_line_starts(text: &str) -> Vec<BytePosition> {
  let bytes = text.as_bytes();
  let mut v = Vec::with_capacity(128);
  v.push(BytePosition(0));

  for (i, b) in bytes.iter().enumerate() {
    if *b == b'\n' {
      v.push(BytePosition((i + 1) as u32));
    }
  }
  v
}

fn upper_bound_line(
  starts: &[BytePosition],
  pos: BytePosition,
) -> usize {
  let mut lo = 0usize;
  let mut hi = starts.len();
  while lo + 1 < hi {
    let mid = (lo + hi) / 2;
    if starts[mid].0 <= pos.0 { lo = mid } else { hi = mid }
  }
  lo
}

fn unicode_column(slice: &[u8]) -> usize {
  std::str::from_utf8(slice)
    .map(|s| s.chars().count())
    .unwrap_or(slice.len())
}

fn text_hash(text: &str) -> u64 {
  let mut h = AHasher::default();
  text.hash(&mut h);
  h.finish()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn location_uses_inclusive_end_column() {
    let mut sm = SourceMap::new();
    let id = sm.add_file("dir/test.fpl", "fun main()\n  val x:Int\n  return x\n".to_string());
    let text = &sm.get(&id).text;
    let start = text.rfind('x').unwrap() as u32;
    let span = Span::new(id, BytePosition(start), BytePosition(start + 1));

    assert_eq!(sm.location(&span), "test.fpl:3.10-3.10");
    assert_eq!(sm.get(&id).module_name(), "test");
  }

  #[test]
  fn location_of_multi_char_span() {
    let mut sm = SourceMap::new();
    let id = sm.add_file("other.fpl", "val myCat = 1\n".to_string());
    let span = Span::new(id, BytePosition(4), BytePosition(9));

    assert_eq!(sm.location(&span), "other.fpl:1.5-1.9");
  }

  #[test]
  fn location_of_multi_byte_char() {
    let mut sm = SourceMap::new();
    let id = sm.add_file("test.fpl", "val a = £\n".to_string());
    let span = Span::new(id, BytePosition(8), BytePosition(10));

    assert_eq!(sm.location(&span), "test.fpl:1.9-1.9");
  }

  #[test]
  fn same_path_returns_same_file() {
    let mut sm = SourceMap::new();
    let a = sm.add_file("a.fpl", "1".to_string());
    let b = sm.add_file("a.fpl", "2".to_string());
    assert_eq!(a, b);
    assert_eq!(sm.len(), 1);
  }
}
