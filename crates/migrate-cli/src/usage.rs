//! Usage text.

use std::io::{self, Write};

/// Printed for `help` and for unknown commands.
pub const USAGE: &str = r#"usage: migrate [-path=<path>] -url=<url> <command> [<args>]

Commands:
   create <name>  Create a new migration
   up             Apply all -up- migrations
   down           Apply all -down- migrations
   reset          Down followed by Up
   redo           Roll back most recent migration, then apply it again
   version        Show current migration version
   migrate <n>    Apply migrations -n|+n
   goto <v>       Migrate to version v
   help           Show this help

Options:
   -url=<url>         Target store (env: MIGRATE_URL)
   -path=<path>       Migrations directory (env: MIGRATE_PATH)
   -format=text|json  Progress output format
   -no-color          Disable coloured output
   -version           Show migrate version

'-path' defaults to current working directory.
"#;

/// Write the usage text.
pub fn write_usage<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(USAGE.as_bytes())?;
    out.flush()
}
