//! Common utilities for building instruction lists
//!
//! Every layout ends in one of two shapes: files that are already where they
//! belong (identity copies, plus any required-but-empty directories), or
//! files that are relocated under a new base. Both helpers check that no two
//! instructions write the same destination before handing the list back.

use std::collections::HashMap;

use crate::install::directives::Instruction;
use crate::install::error::{InstallError, Result};
use crate::install::vfs::ModPath;

/// Identity placement: one `Copy(p, p)` per path, then one `MakeDirectory`
/// for each required directory that none of the paths lives under
pub fn instructions_for_same_source_and_dest_paths(
    paths: &[ModPath],
    required_dirs: &[ModPath],
) -> Result<Vec<Instruction>> {
    let mut instructions: Vec<Instruction> = paths
        .iter()
        .map(|path| Instruction::copy(path.clone(), path.clone()))
        .collect();

    for dir in required_dirs {
        let has_files = paths.iter().any(|path| path.starts_with_dir(dir.as_str()));
        if !has_files {
            instructions.push(Instruction::make_directory(dir.clone()));
        }
    }

    ensure_unique_destinations(&instructions)?;
    Ok(instructions)
}

/// Relocation: one `Move(source, destination)` per pair
pub fn instructions_for_source_to_dest_pairs(pairs: &[(ModPath, ModPath)]) -> Result<Vec<Instruction>> {
    let instructions: Vec<Instruction> = pairs
        .iter()
        .map(|(source, destination)| Instruction::relocate(source.clone(), destination.clone()))
        .collect();

    ensure_unique_destinations(&instructions)?;
    Ok(instructions)
}

/// Map a path below `from` to the same relative path below `to`.
///
/// Paths that are not below `from` keep their full path under `to`.
pub fn move_from_to<'a>(from: &'a ModPath, to: &'a ModPath) -> impl Fn(&ModPath) -> (ModPath, ModPath) + 'a {
    move |path: &ModPath| {
        let suffix = path.strip_dir_prefix(from.as_str()).unwrap_or(path.as_str());
        (path.clone(), to.join(suffix))
    }
}

/// Concatenate instruction groups, in order, re-checking destinations
/// across the groups
pub fn merge_instruction_groups(groups: Vec<Vec<Instruction>>) -> Result<Vec<Instruction>> {
    let merged: Vec<Instruction> = groups.into_iter().flatten().collect();
    ensure_unique_destinations(&merged)?;
    Ok(merged)
}

/// Fail with [`InstallError::DuplicateDestination`] on the first destination
/// written by more than one instruction (compared case-insensitively)
pub fn ensure_unique_destinations(instructions: &[Instruction]) -> Result<()> {
    let mut seen: HashMap<&ModPath, usize> = HashMap::with_capacity(instructions.len());

    for (idx, instruction) in instructions.iter().enumerate() {
        if let Some(&first) = seen.get(instruction.destination()) {
            let files = [&instructions[first], instruction]
                .iter()
                .map(|i| i.source().unwrap_or(i.destination()).to_string())
                .collect();
            return Err(InstallError::DuplicateDestination {
                destination: instruction.destination().to_string(),
                files,
            });
        }
        seen.insert(instruction.destination(), idx);
    }

    Ok(())
}
