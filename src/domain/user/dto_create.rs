/// Candidate for registration. Validated at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
}
