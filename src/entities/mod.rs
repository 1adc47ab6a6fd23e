pub mod attendance_log;
pub mod attendance_session;
pub mod class_enrollment;
pub mod sea_orm_active_enums;
pub mod session_attendee;
pub mod student_score;
pub mod teaching_class;
