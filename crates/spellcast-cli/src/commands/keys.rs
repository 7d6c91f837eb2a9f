// List key names and modifier aliases

use spellcast_hotkey::keys::{KEY_ALIASES, NAMED_KEYS};
use spellcast_hotkey::{KeyNameResolver, Modifier, NativeKeyCode, Platform, PlatformResolver};

use super::parse::format_code;
use super::Command;
use crate::error::CliResult;
use crate::output::OutputStyle;

/// Every key name a descriptor may use on `resolver`'s platform
pub fn key_names(resolver: &dyn KeyNameResolver) -> Vec<(String, NativeKeyCode)> {
    let alphanumeric = ('a'..='z').chain('0'..='9').filter_map(|c| {
        let name = c.to_string();
        resolver.code_for_name(&name).map(|code| (name, code))
    });

    alphanumeric
        .chain(NAMED_KEYS.iter().map(|(name, code)| (name.to_string(), *code)))
        .chain(
            resolver
                .special_keys()
                .iter()
                .map(|(name, code)| (name.to_string(), *code)),
        )
        .collect()
}

/// Accepted spellings for each modifier, in canonical order
pub fn modifier_spellings(resolver: &PlatformResolver) -> Vec<(Modifier, Vec<&'static str>)> {
    Modifier::ALL
        .iter()
        .map(|modifier| {
            let spellings = resolver
                .modifier_aliases()
                .iter()
                .filter(|(_, m)| m == modifier)
                .map(|(alias, _)| *alias)
                .collect();
            (*modifier, spellings)
        })
        .collect()
}

/// Show the key table for a platform
pub struct KeysCommand {
    platform: Option<Platform>,
}

impl KeysCommand {
    pub fn new(platform: Option<Platform>) -> Self {
        Self { platform }
    }
}

#[async_trait::async_trait]
impl Command for KeysCommand {
    async fn execute(&self) -> CliResult<()> {
        let style = OutputStyle::default();
        let resolver = PlatformResolver::new(self.platform.unwrap_or_else(Platform::current));

        println!("{}", style.header(&format!("Key names for {}", resolver.platform())));

        println!("{}", style.section("Modifiers"));
        for (modifier, spellings) in modifier_spellings(&resolver) {
            println!("{}", style.key_value(modifier.as_str(), &spellings.join(", ")));
        }

        println!("{}", style.section("Keys"));
        for (name, code) in key_names(&resolver) {
            println!("  {:<12} {}", style.code(&name), format_code(code));
        }

        println!("{}", style.section("Aliases"));
        for (alias, name) in KEY_ALIASES {
            println!("{}", style.key_value(alias, name));
        }
        Ok(())
    }
}
