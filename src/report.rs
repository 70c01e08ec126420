//! Console report of a run.
//!
//! Each `write_*` function renders into any writer; the `print_*` wrappers
//! send the same text to stdout.

use crate::models::{ListingRecord, RoomRecord};
use crate::scenario::Validation;
use std::io::{self, Write};

const LISTING_RULE: &str = "----------------------------------";
const ROOM_RULE: &str = "------------------------------";

fn yes_or_not_shown(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO/NOT SHOWN"
    }
}

pub fn write_listings<W: Write>(out: &mut W, listings: &[ListingRecord]) -> io::Result<()> {
    writeln!(out, "Hotels Found (after filters attempt): {}", listings.len())?;
    for listing in listings {
        writeln!(out, "Hotel: {}", listing.name)?;
        writeln!(out, "Price: {}", listing.price)?;
        writeln!(out, "Rating: {}", listing.rating)?;
        writeln!(
            out,
            "Breakfast Included: {}",
            yes_or_not_shown(listing.breakfast_included)
        )?;
        writeln!(
            out,
            "Free Cancellation: {}",
            yes_or_not_shown(listing.free_cancellation)
        )?;
        writeln!(out, "Image: {}", listing.image_url)?;
        writeln!(out, "{LISTING_RULE}")?;
    }
    Ok(())
}

pub fn write_validation<W: Write>(
    out: &mut W,
    validation: &Validation,
    minimum: usize,
) -> io::Result<()> {
    match validation {
        Validation::Passed { count } => writeln!(
            out,
            "✅ Validation PASSED: at least {minimum} hotels after filters. Count={count}"
        ),
        Validation::Failed { count } => writeln!(
            out,
            "❌ Validation FAILED: less than {minimum} hotels after filters. Count={count}"
        ),
    }
}

pub fn write_detail_header<W: Write>(out: &mut W, url: &str) -> io::Result<()> {
    writeln!(out, "\n=========== HOTEL DETAIL PAGE ===========")?;
    writeln!(out, "URL: {url}")
}

pub fn write_rooms<W: Write>(out: &mut W, rooms: &[RoomRecord]) -> io::Result<()> {
    if rooms.is_empty() {
        return writeln!(out, "❌ Rooms not found in availability table.");
    }
    writeln!(out, "✅ Rooms Found: {}", rooms.len())?;
    for room in rooms {
        writeln!(out, "Room: {}", room.room_type)?;
        writeln!(out, "Price: {}", room.price)?;
        writeln!(out, "{ROOM_RULE}")?;
    }
    Ok(())
}

pub fn write_sections<W: Write>(out: &mut W, visible: bool) -> io::Result<()> {
    if visible {
        writeln!(out, "✅ Reviews/Policies section is visible.")
    } else {
        writeln!(
            out,
            "⚠️ Reviews/Policies section not found (depends on hotel page layout)."
        )
    }
}

pub fn print_listings(listings: &[ListingRecord]) -> io::Result<()> {
    write_listings(&mut io::stdout().lock(), listings)
}

pub fn print_validation(validation: &Validation, minimum: usize) -> io::Result<()> {
    write_validation(&mut io::stdout().lock(), validation, minimum)
}

pub fn print_detail_header(url: &str) -> io::Result<()> {
    write_detail_header(&mut io::stdout().lock(), url)
}

pub fn print_rooms(rooms: &[RoomRecord]) -> io::Result<()> {
    write_rooms(&mut io::stdout().lock(), rooms)
}

pub fn print_sections(visible: bool) -> io::Result<()> {
    write_sections(&mut io::stdout().lock(), visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn listing_block_layout() {
        let listing = ListingRecord {
            name: "Sea Breeze Resort".to_string(),
            price: "₹ 12,000".to_string(),
            rating: "8.7".to_string(),
            image_url: "https://img.example/a.jpg".to_string(),
            breakfast_included: true,
            free_cancellation: false,
        };

        let text = render(|out| write_listings(out, &[listing]));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Hotels Found (after filters attempt): 1",
                "Hotel: Sea Breeze Resort",
                "Price: ₹ 12,000",
                "Rating: 8.7",
                "Breakfast Included: YES",
                "Free Cancellation: NO/NOT SHOWN",
                "Image: https://img.example/a.jpg",
                LISTING_RULE,
            ]
        );
    }

    #[test]
    fn validation_lines() {
        let passed = render(|out| write_validation(out, &Validation::Passed { count: 5 }, 3));
        assert_eq!(
            passed.trim_end(),
            "✅ Validation PASSED: at least 3 hotels after filters. Count=5"
        );

        let failed = render(|out| write_validation(out, &Validation::Failed { count: 1 }, 3));
        assert!(failed.starts_with("❌ Validation FAILED"));
        assert!(failed.trim_end().ends_with("Count=1"));
    }

    #[test]
    fn empty_room_table_reports_not_found() {
        let text = render(|out| write_rooms(out, &[]));
        assert_eq!(text.trim_end(), "❌ Rooms not found in availability table.");
    }

    #[test]
    fn rooms_are_listed_with_count() {
        let rooms = vec![
            RoomRecord::new("Deluxe Room", "₹ 4,500"),
            RoomRecord::new("Suite", ""),
        ];

        let text = render(|out| write_rooms(out, &rooms));

        assert!(text.starts_with("✅ Rooms Found: 2\n"));
        assert!(text.contains("Room: Suite\nPrice: Price not found\n"));
    }

    #[test]
    fn sections_line() {
        assert!(render(|out| write_sections(out, true)).contains("is visible"));
        assert!(render(|out| write_sections(out, false)).contains("not found"));
    }
}
