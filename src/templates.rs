//! Built-in cover letter and cold email starting points.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    CoverLetter,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    /// Experience level for cover letters, send timing for emails.
    pub note: &'static str,
    pub body: &'static str,
    pub tags: &'static [&'static str],
}

pub const COVER_LETTERS: [Template; 12] = [
    Template {
        title: "Full-Stack Developer",
        description: "Perfect for roles requiring both frontend and backend expertise",
        category: "Software Engineering",
        note: "Intermediate",
        body: "Dear Hiring Manager,\n\nI am writing to express my interest in the Full-Stack Developer role at [Company Name]. My experience with modern frontend frameworks and scalable backend systems allows me to build robust applications end-to-end...",
        tags: &["React", "Node.js", "PostgreSQL"],
    },
    Template {
        title: "Frontend Engineer",
        description: "Ideal for roles focused on UI/UX and frontend performance",
        category: "Software Engineering",
        note: "Beginner",
        body: "Dear Hiring Manager,\n\nI'm excited to apply for the Frontend Engineer position at [Company Name]. With a strong eye for detail and passion for clean UI, I have developed accessible and performance-driven interfaces using modern tools...",
        tags: &["JavaScript", "React", "TailwindCSS"],
    },
    Template {
        title: "Backend Developer",
        description: "For engineers focusing on APIs, databases, and architecture",
        category: "Software Engineering",
        note: "Intermediate",
        body: "Dear Hiring Team,\n\nI am thrilled to apply for the Backend Developer position at [Company Name]. With deep expertise in server-side logic, scalable database design, and RESTful APIs, I ensure high-performance backend systems...",
        tags: &["Node.js", "Express", "MongoDB"],
    },
    Template {
        title: "UI/UX Designer (Tech-focused)",
        description: "Blends technical UI skills with user-centered design thinking",
        category: "Software Engineering",
        note: "Intermediate",
        body: "Dear [Hiring Manager],\n\nAs a UI/UX Designer passionate about seamless user journeys, I bring a strong background in prototyping, usability testing, and responsive design to enhance your digital experience...",
        tags: &["Figma", "Design Systems", "Accessibility"],
    },
    Template {
        title: "Freelance Software Developer",
        description: "For remote, contract-based, or freelance opportunities",
        category: "Software Engineering",
        note: "Intermediate",
        body: "Dear Client,\n\nAs a freelance software developer, I've delivered high-quality solutions for startups and established companies alike. I specialize in fast-paced, client-focused development cycles with full transparency...",
        tags: &["Remote", "Client Work", "Agile"],
    },
    Template {
        title: "Junior Software Developer",
        description: "Great for early-career candidates starting in tech",
        category: "Software Engineering",
        note: "Beginner",
        body: "Dear [Hiring Manager],\n\nI'm eager to begin my software development career with [Company Name]. As a recent graduate with a strong foundation in JavaScript and Git workflows, I'm ready to learn, adapt, and contribute to your engineering team...",
        tags: &["JavaScript", "Git", "Team Player"],
    },
    Template {
        title: "Senior Software Engineer",
        description: "For experienced engineers taking on technical leadership",
        category: "Software Engineering",
        note: "Advanced",
        body: "Dear Hiring Manager,\n\nWith over 6 years of experience leading engineering teams and scaling distributed systems, I'm excited to bring my expertise to [Company Name]. I excel at mentoring developers, optimizing system performance, and driving architectural decisions...",
        tags: &["Leadership", "Microservices", "Mentoring"],
    },
    Template {
        title: "Associate Software Engineer",
        description: "Entry-level developer with some industry experience",
        category: "Software Engineering",
        note: "Beginner",
        body: "Dear [Hiring Manager],\n\nAs an Associate Software Engineer with a passion for problem-solving and clean code, I'm excited to contribute to innovative products at [Company Name]. I bring internship and academic project experience that aligns with your tech stack...",
        tags: &["React", "REST APIs", "Team Collaboration"],
    },
    Template {
        title: "Software Engineering Intern",
        description: "For students or recent grads seeking internship experience",
        category: "Software Engineering",
        note: "Beginner",
        body: "Dear Team,\n\nI am excited to apply for the Software Engineering Internship at [Company Name]. As a computer science student with a passion for building, I've completed hands-on projects using Python and React, and I'm eager to grow within your team...",
        tags: &["Internship", "Python", "React"],
    },
    Template {
        title: "Mobile App Developer",
        description: "Focuses on iOS/Android development roles",
        category: "Software Engineering",
        note: "Intermediate",
        body: "Dear Hiring Manager,\n\nAs a mobile app developer, I build intuitive and performant apps using React Native and Swift. I am enthusiastic about creating pixel-perfect experiences across mobile platforms...",
        tags: &["React Native", "Swift", "Mobile UX"],
    },
    Template {
        title: "Cloud Engineer",
        description: "Ideal for candidates with infrastructure-as-code and DevOps skills",
        category: "Software Engineering",
        note: "Advanced",
        body: "Dear [Hiring Team],\n\nI'm excited to apply for the Cloud Engineer role. With hands-on experience in AWS, Terraform, and Kubernetes, I help organizations scale reliably and automate infrastructure with modern DevOps practices...",
        tags: &["AWS", "Terraform", "Kubernetes"],
    },
    Template {
        title: "AI Research Engineer",
        description: "Blends software engineering and machine learning research",
        category: "Software Engineering",
        note: "Advanced",
        body: "Dear [Hiring Manager],\n\nWith a passion for both algorithmic design and scientific rigor, I'm applying for the AI Research Engineer role. My experience includes publishing research, building ML pipelines, and deploying models at scale...",
        tags: &["ML", "PyTorch", "Research"],
    },
];

pub const EMAILS: [Template; 8] = [
    Template {
        title: "Follow-up After Interview",
        description: "Professional follow-up email to send after your interview",
        category: "Follow-up",
        note: "24-48 hours",
        body: "Subject: Thank you for the interview - [Your Name]\n\nDear [Interviewer Name],\n\nThank you for taking the time to meet with me yesterday to discuss the [Position Title] role at [Company Name]. I enjoyed our conversation about...",
        tags: &["Interview", "Thank You", "Professional"],
    },
    Template {
        title: "Networking Introduction",
        description: "Perfect for reaching out to new professional connections",
        category: "Networking",
        note: "Anytime",
        body: "Subject: Introduction from [Mutual Connection]\n\nHi [Name],\n\n[Mutual Connection] suggested I reach out to you. I'm currently [your role/situation] and would love to learn more about your experience in...",
        tags: &["Networking", "Introduction", "Connection"],
    },
    Template {
        title: "Job Application Follow-up",
        description: "Follow up on your job application status professionally",
        category: "Follow-up",
        note: "1-2 weeks",
        body: "Subject: Following up on [Position Title] Application\n\nDear Hiring Manager,\n\nI hope this email finds you well. I wanted to follow up on my application for the [Position Title] position that I submitted on [Date]...",
        tags: &["Application", "Status Check", "Professional"],
    },
    Template {
        title: "LinkedIn Connection Request",
        description: "Personalized message for LinkedIn connection requests",
        category: "Social Media",
        note: "Anytime",
        body: "Hi [Name],\n\nI came across your profile and was impressed by your work in [specific area]. I'm currently [your situation] and would love to connect and learn from your experience in [industry/field]...",
        tags: &["LinkedIn", "Connection", "Social"],
    },
    Template {
        title: "Informational Interview Request",
        description: "Request an informational interview with industry professionals",
        category: "Networking",
        note: "Anytime",
        body: "Subject: Request for Informational Interview\n\nDear [Name],\n\nI hope this email finds you well. I'm currently exploring opportunities in [industry/field] and would greatly appreciate the chance to learn from your expertise...",
        tags: &["Informational", "Interview", "Learning"],
    },
    Template {
        title: "Salary Negotiation",
        description: "Professional approach to salary and benefits negotiation",
        category: "Negotiation",
        note: "After offer",
        body: "Subject: [Position Title] Offer Discussion\n\nDear [Hiring Manager],\n\nThank you for extending the offer for the [Position Title] role. I'm excited about the opportunity to join [Company Name] and contribute to...",
        tags: &["Negotiation", "Salary", "Benefits"],
    },
    Template {
        title: "Rejection Response",
        description: "Graceful response to job rejection while keeping doors open",
        category: "Response",
        note: "Within 24 hours",
        body: "Subject: Thank you for the opportunity\n\nDear [Hiring Manager],\n\nThank you for informing me about your decision regarding the [Position Title] role. While I'm disappointed, I understand that you had many qualified candidates...",
        tags: &["Rejection", "Professional", "Future"],
    },
    Template {
        title: "Referral Request",
        description: "Ask for referrals from your professional network",
        category: "Networking",
        note: "Anytime",
        body: "Subject: Seeking Your Advice and Potential Referral\n\nHi [Name],\n\nI hope you're doing well! I'm currently exploring new opportunities in [field/industry] and wondered if you might know of any openings that would be a good fit...",
        tags: &["Referral", "Network", "Opportunity"],
    },
];

impl TemplateKind {
    pub fn label(self) -> &'static str {
        match self {
            TemplateKind::CoverLetter => "Cover letter templates",
            TemplateKind::Email => "Email templates",
        }
    }
}

pub fn catalog(kind: TemplateKind) -> &'static [Template] {
    match kind {
        TemplateKind::CoverLetter => &COVER_LETTERS,
        TemplateKind::Email => &EMAILS,
    }
}

/// Case-insensitive match on title, category or any tag. An empty query matches everything.
pub fn search(kind: TemplateKind, query: &str) -> Vec<&'static Template> {
    let needle = query.trim().to_lowercase();
    catalog(kind)
        .iter()
        .filter(|t| {
            needle.is_empty()
                || t.title.to_lowercase().contains(&needle)
                || t.category.to_lowercase().contains(&needle)
                || t.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Look a template up by 1-based position or exact title.
pub fn find(kind: TemplateKind, key: &str) -> Option<&'static Template> {
    let key = key.trim();
    let all = catalog(kind);
    match key.parse::<usize>() {
        Ok(n) if n >= 1 => all.get(n - 1),
        _ => all.iter().find(|t| t.title.eq_ignore_ascii_case(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_has_a_body_and_tags() {
        for kind in [TemplateKind::CoverLetter, TemplateKind::Email] {
            for t in catalog(kind) {
                assert!(!t.body.trim().is_empty(), "{}", t.title);
                assert!(!t.tags.is_empty(), "{}", t.title);
            }
        }
    }

    #[test]
    fn search_matches_tags_and_categories() {
        let cloud = search(TemplateKind::CoverLetter, "kubernetes");
        assert_eq!(cloud.len(), 1);
        assert_eq!(cloud[0].title, "Cloud Engineer");

        let networking = search(TemplateKind::Email, "Networking");
        assert!(networking.len() >= 3);
        assert_eq!(search(TemplateKind::Email, "").len(), EMAILS.len());
    }

    #[test]
    fn find_by_position_or_title() {
        assert_eq!(
            find(TemplateKind::Email, "1").map(|t| t.title),
            Some("Follow-up After Interview")
        );
        assert_eq!(
            find(TemplateKind::CoverLetter, "backend developer").map(|t| t.note),
            Some("Intermediate")
        );
        assert!(find(TemplateKind::CoverLetter, "0").is_none());
        assert!(find(TemplateKind::CoverLetter, "99").is_none());
    }
}
