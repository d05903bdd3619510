//! Ratings-by-grade summary CSV (`Grade,Countries`).

use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::io::{create_file, csv_write_err};
use crate::rating::GradeGroup;

pub const GRADES_FILE: &str = "ratings_by_grade.csv";

pub fn write_grades<W: Write>(out: W, groups: &[GradeGroup]) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record(["Grade", "Countries"]).map_err(csv_write_err)?;
    for g in groups {
        w.write_record([g.category.display_name().to_string(), g.countries.join(", ")])
            .map_err(csv_write_err)?;
    }
    w.flush().map_err(csv_write_err)
}

pub fn save_grades(path: &Path, groups: &[GradeGroup]) -> Result<(), AppError> {
    write_grades(create_file(path)?, groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::GradeCategory;

    #[test]
    fn countries_are_joined_in_one_quoted_cell() {
        let groups = [
            GradeGroup {
                category: GradeCategory::Prime,
                countries: vec!["Germany".to_string(), "Netherlands".to_string()],
            },
            GradeGroup {
                category: GradeCategory::NoRating,
                countries: vec!["Atlantis".to_string()],
            },
        ];
        let mut buf = Vec::new();
        write_grades(&mut buf, &groups).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Grade,Countries\nPrime,\"Germany, Netherlands\"\nNo Rating,Atlantis\n"
        );
    }
}
