//! Room catalog inspection.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use seatplan_allocate::{Buffer, Density, Room, RoomCatalog, RoomKind};
use seatplan_workbook::ingest;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{display_option, print_info, print_output, print_single, OutputFormat};

use super::CommandContext;

/// Show the room catalog in the order a strategy walks it.
#[derive(Debug, Args)]
pub struct RoomsCommand {
    /// Room workbook (`Room No.`, `Exam Capacity`).
    #[arg(long)]
    rooms: Option<PathBuf>,

    /// Seats held back in every room (0-5). Defaults to the saved value or 0.
    #[arg(long, allow_negative_numbers = true)]
    buffer: Option<i64>,

    /// Order to show: 1/dense or 2/sparse. Defaults to the saved value or dense.
    #[arg(long)]
    density: Option<String>,
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct RoomRow {
    #[tabled(rename = "#")]
    position: usize,

    #[tabled(rename = "Room")]
    room: String,

    #[tabled(rename = "Kind")]
    kind: &'static str,

    #[tabled(rename = "Floor", display = "display_option")]
    floor: Option<u8>,

    #[tabled(rename = "Capacity")]
    capacity: u32,

    #[tabled(rename = "Usable")]
    usable: u32,
}

impl RoomRow {
    fn new(position: usize, room: &Room) -> Self {
        let (kind, floor) = match room.kind {
            RoomKind::Floor { floor } => ("floor", Some(floor)),
            RoomKind::LectureTheatre { theatre_floor } => ("lecture theatre", theatre_floor),
        };
        Self {
            position,
            room: room.room_no.to_string(),
            kind,
            floor,
            capacity: room.capacity,
            usable: room.remaining,
        }
    }
}

#[derive(Debug, Serialize)]
struct CatalogView {
    density: Density,
    buffer: Buffer,
    total_usable: u64,
    rooms: Vec<RoomRow>,
}

impl RoomsCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let path = ctx.input(self.rooms, ctx.config.rooms_path())?;
        let buffer = match (self.buffer, ctx.config.buffer) {
            (Some(value), _) => Buffer::new(value)?,
            (None, saved) => saved.unwrap_or_default(),
        };
        let density = match (self.density, ctx.config.density) {
            (Some(value), _) => value.parse()?,
            (None, saved) => saved.unwrap_or_default(),
        };

        let raw = ingest::read_rooms(&path)
            .with_context(|| format!("Failed to read rooms from {:?}", path))?;
        let catalog = RoomCatalog::build(raw, buffer)?;
        let view = catalog_view(&catalog, density);

        match ctx.format {
            OutputFormat::Json => print_single(&view),
            OutputFormat::Table => {
                print_output(&view.rooms, ctx.format);
                print_info(&format!(
                    "{} room(s), {} usable seat(s) per session with buffer {}",
                    view.rooms.len(),
                    view.total_usable,
                    view.buffer
                ));
            }
        }
        Ok(())
    }
}

fn catalog_view(catalog: &RoomCatalog, density: Density) -> CatalogView {
    let ordered = density.strategy().order_rooms(catalog);
    CatalogView {
        density,
        buffer: catalog.buffer(),
        total_usable: catalog.total_capacity(),
        rooms: ordered
            .iter()
            .enumerate()
            .map(|(i, room)| RoomRow::new(i + 1, room))
            .collect(),
    }
}
