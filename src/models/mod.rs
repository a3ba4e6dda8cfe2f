//! Domain models mirroring the backend's JSON serializers.

mod question;
mod quiz;
mod team;

pub use question::{Difficulty, NewQuestion, Question, QuestionType};
pub use quiz::{NewQuiz, NewQuizQuestion, NewRound, Quiz, QuizQuestion, Round, RoundType};
pub use team::{NewTeam, Team};
