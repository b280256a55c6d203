//! Non-interactive output: one diff written to a terminal stream

use crate::color::to_crossterm;
use crate::views::{display_hunks, DiffStyle};
use crossterm::queue;
use crossterm::style::{Attribute, Print, ResetColor, SetAttribute, SetForegroundColor};
use stanza_core::{DiffTree, HunkPriority, HunkStatus};
use std::io::{self, Write};

pub fn write_diff(
    out: &mut impl Write,
    tree: &DiffTree,
    priority: HunkPriority,
    style: &DiffStyle,
) -> io::Result<()> {
    for (i, paragraph) in tree.paragraphs().iter().enumerate() {
        if i > 0 {
            queue!(out, Print("\n"))?;
        }
        for line in paragraph.lines() {
            for hunk in display_hunks(line, priority, style) {
                match hunk.status {
                    HunkStatus::Unchanged => queue!(out, Print(&hunk.content))?,
                    HunkStatus::Added => queue!(
                        out,
                        SetForegroundColor(to_crossterm(style.theme.added)),
                        Print(&hunk.content),
                        ResetColor
                    )?,
                    HunkStatus::Removed => {
                        queue!(out, SetForegroundColor(to_crossterm(style.theme.removed)))?;
                        if style.strikethrough_deletions {
                            queue!(out, SetAttribute(Attribute::CrossedOut))?;
                        }
                        queue!(
                            out,
                            Print(&hunk.content),
                            SetAttribute(Attribute::Reset),
                            ResetColor
                        )?;
                    }
                }
            }
            queue!(out, Print("\n"))?;
        }
    }
    out.flush()
}
