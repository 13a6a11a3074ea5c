pub mod gemini;

pub mod models {
    pub mod requests;
    pub mod responses;
}
