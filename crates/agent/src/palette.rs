//! Block-type to map-color lookup.
//!
//! The host runtime's block registry is out of scope here; this is the
//! small built-in table the fake runtime (and, for now, the real embedder)
//! consults to turn a `block_type` string into the RGBA the tile compositor
//! paints. Unknown type ids resolve to [`MapColor::NONE`], which
//! `scan_column` treats as colorless and steps past.

use cartograph_protocol::MapColor;

const fn rgb(r: u8, g: u8, b: u8) -> MapColor {
  MapColor { r, g, b, a: 255 }
}

/// Built-in block type id -> color table, ordered roughly by how common the
/// block is on a fully scanned surface.
const TABLE: &[(&str, MapColor)] = &[
  ("grass", rgb(127, 178, 56)),
  ("dirt", rgb(151, 109, 77)),
  ("stone", rgb(112, 112, 112)),
  ("bedrock", rgb(41, 41, 41)),
  ("sand", rgb(247, 233, 163)),
  ("sandstone", rgb(240, 228, 176)),
  ("gravel", rgb(135, 129, 124)),
  ("water", rgb(64, 99, 199)),
  ("lava", rgb(207, 98, 10)),
  ("snow", rgb(249, 254, 254)),
  ("ice", rgb(160, 188, 255)),
  ("wood", rgb(143, 119, 72)),
  ("leaves", rgb(59, 96, 36)),
  ("clay", rgb(162, 166, 182)),
  ("obsidian", rgb(20, 18, 29)),
  ("netherrack", rgb(111, 54, 52)),
  ("end_stone", rgb(219, 222, 159)),
];

/// Resolves a block type id to its map color, or [`MapColor::NONE`] if the
/// id is not in the table.
pub fn color_for(block_type: &str) -> MapColor {
  TABLE
    .iter()
    .find(|(id, _)| *id == block_type)
    .map(|(_, color)| *color)
    .unwrap_or(MapColor::NONE)
}
