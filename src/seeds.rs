//! Built-in sample challenges so a fresh server has something to play.

use std::collections::BTreeMap;

use crate::config::ChallengeCfg;
use crate::domain::Difficulty;

fn single(id: &str, title: &str, points: u32, difficulty: Difficulty, category: &str, flag: &str) -> ChallengeCfg {
  ChallengeCfg {
    id: id.into(),
    title: title.into(),
    points,
    difficulty,
    category: category.into(),
    hidden: false,
    flag: Some(flag.into()),
    parts: None,
    part_flags: BTreeMap::new(),
  }
}

pub fn seed_challenges() -> Vec<ChallengeCfg> {
  let mut relay = single("header-relay", "Header Relay", 150, Difficulty::Hard, "Web", "");
  relay.flag = None;
  relay.parts = Some(toml::Value::Table(toml::Table::from_iter([
    ("flag1".to_string(), toml::Value::String("flag1{...}".into())),
    ("flag2".to_string(), toml::Value::String("flag2{...}".into())),
  ])));
  relay.part_flags = BTreeMap::from([
    ("flag1".to_string(), "flag1{forwarded_for}".to_string()),
    ("flag2".to_string(), "flag2{trusted_proxy}".to_string()),
  ]);

  vec![
    single("caesar", "Caesar Cipher", 50, Difficulty::Easy, "Cryptography", "hello world"),
    single("base64", "Base64 Decode", 75, Difficulty::Easy, "Cryptography", "flag{this_is_easy}"),
    single("xor", "Simple XOR", 100, Difficulty::Medium, "Cryptography", "flag{test}"),
    single("rot13", "ROT13 Cipher", 50, Difficulty::Easy, "Cryptography", "flag{is_rotated}"),
    single("vigenere", "Vigenère Cipher", 150, Difficulty::Medium, "Cryptography", "flag{vigenere_is_fun}"),
    single("morse", "Morse Code", 75, Difficulty::Easy, "Cryptography", "flag{morse code}"),
    single("robots", "Robots Know", 100, Difficulty::Easy, "Web", "flag{disallowed_paths}"),
    relay,
  ]
}
