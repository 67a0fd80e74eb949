use super::{FieldSpec, Schema};

pub static ACADEMIC_YEAR: Schema = Schema {
    collection: "academic_years",
    fields: &[FieldSpec::text("academic_year", "Academic year")],
};

pub static TEACHING_LOAD: Schema = Schema {
    collection: "teaching_load",
    fields: &[
        FieldSpec::text("class_name", "Class"),
        FieldSpec::text("subject", "Subject"),
        FieldSpec::number("lectures_allotted", "Lectures allotted"),
        FieldSpec::number("lectures_taken", "Lectures taken"),
    ],
};

pub static LEAVE: Schema = Schema {
    collection: "leaves",
    fields: &[
        FieldSpec::text("leave_type", "Leave type"),
        FieldSpec::text("leave_from", "From"),
        FieldSpec::text("leave_to", "To"),
        FieldSpec::number("number_of_days", "Number of days"),
    ],
};

pub static DEPARTMENTAL_ACTIVITY: Schema = Schema {
    collection: "departmental_activities",
    fields: &[
        FieldSpec::text("activity", "Activity"),
        FieldSpec::text("role", "Role"),
        FieldSpec::number("credit_points", "Credit points"),
    ],
};

pub static SWAYAM: Schema = Schema {
    collection: "swayam",
    fields: &[
        FieldSpec::text("name_of_swayam_undertaken", "Name of SWAYAM course"),
        FieldSpec::text("swayam_date", "Date"),
        FieldSpec::number("swayam_duration", "Duration (weeks)"),
        FieldSpec::text("certification_status", "Certification status"),
    ],
};

pub static RESEARCH_PAPER: Schema = Schema {
    collection: "research_papers",
    fields: &[
        FieldSpec::text("title_of_paper", "Title of paper"),
        FieldSpec::text("journal_name", "Journal"),
        FieldSpec::text("issn_number", "ISSN"),
        FieldSpec::text("publication_date", "Publication date"),
        FieldSpec::number("impact_factor", "Impact factor"),
    ],
};

pub static PROFILE: Schema = Schema {
    collection: "profiles",
    fields: &[
        FieldSpec::text("full_name", "Full name"),
        FieldSpec::text("designation", "Designation"),
        FieldSpec::text("department", "Department"),
        FieldSpec::text("date_of_joining", "Date of joining"),
        FieldSpec::text("highest_qualification", "Highest qualification"),
    ],
};

/// An annexure sub-resource mounted at `path` with list/create/edit/update routes.
#[derive(Debug)]
pub struct Resource {
    pub title: &'static str,
    pub path: &'static str,
    pub schema: &'static Schema,
    /// Entries belong to the session's current academic year
    pub year_scoped: bool,
}

impl Resource {
    pub fn edit_path(&self, id: impl std::fmt::Display) -> String {
        format!("{}/edit/{}", self.path, id)
    }
}

pub const TEACHING_LOAD_PATH: &str = "/academicPerformance/teachingLoad";

pub static RESOURCES: &[Resource] = &[
    Resource {
        title: "Teaching Load",
        path: TEACHING_LOAD_PATH,
        schema: &TEACHING_LOAD,
        year_scoped: true,
    },
    Resource {
        title: "Leave",
        path: "/leave/details",
        schema: &LEAVE,
        year_scoped: true,
    },
    Resource {
        title: "Annexure I - Departmental Activities",
        path: "/annexure-1/departmentalActivities",
        schema: &DEPARTMENTAL_ACTIVITY,
        year_scoped: true,
    },
    Resource {
        title: "Annexure II - SWAYAM Courses",
        path: "/annexure-2/swayam",
        schema: &SWAYAM,
        year_scoped: true,
    },
    Resource {
        title: "Annexure III - Research Papers",
        path: "/annexure-3/researchPapers",
        schema: &RESEARCH_PAPER,
        year_scoped: true,
    },
    Resource {
        title: "Profile",
        path: "/profile/details",
        schema: &PROFILE,
        year_scoped: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;
    use std::collections::HashSet;

    #[test]
    fn resource_paths_and_collections_are_unique() {
        let paths: HashSet<_> = RESOURCES.iter().map(|r| r.path).collect();
        let collections: HashSet<_> = RESOURCES.iter().map(|r| r.schema.collection).collect();
        assert_eq!(paths.len(), RESOURCES.len());
        assert_eq!(collections.len(), RESOURCES.len());
        assert!(!collections.contains(ACADEMIC_YEAR.collection));
    }

    #[test]
    fn swayam_shape() {
        let names: Vec<_> = SWAYAM.fields.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            ["name_of_swayam_undertaken", "swayam_date", "swayam_duration", "certification_status"]
        );
        assert_eq!(SWAYAM.field("swayam_duration").map(|f| f.kind), Some(FieldKind::Number));
    }

    #[test]
    fn builds_edit_path() {
        let swayam = RESOURCES.iter().find(|r| r.path == "/annexure-2/swayam").unwrap();
        assert_eq!(swayam.edit_path("abc"), "/annexure-2/swayam/edit/abc");
    }
}
