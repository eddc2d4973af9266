use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::pkg::internal::adaptors::students::{
    selectors::StudentSelector,
    spec::{CreateStudentInput, PatchStudentInput, StudentEntry},
};
use crate::prelude::Result;

const RETURNING: &str =
    "RETURNING id, name, email, mobile_number, usn, course, sem, branch, role";

pub struct StudentMutator<'a> {
    pool: &'a PgPool,
}

impl<'a> StudentMutator<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        StudentMutator { pool }
    }

    pub async fn create(&self, student: CreateStudentInput) -> Result<StudentEntry> {
        let mut conn = self.pool.acquire().await?;
        insert_one(&mut *conn, student).await
    }

    /// Bulk insert is all-or-nothing: any failing record rolls back the
    /// whole batch.
    pub async fn create_bulk(
        &self,
        students: Vec<CreateStudentInput>,
    ) -> Result<Vec<StudentEntry>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(students.len());
        for student in students {
            created.push(insert_one(&mut *tx, student).await?);
        }
        tx.commit().await?;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i32,
        patch: PatchStudentInput,
    ) -> Result<Option<StudentEntry>> {
        if patch.is_empty() {
            return StudentSelector::new(self.pool).get_by_id(id).await;
        }
        let mut qb = QueryBuilder::new("UPDATE students SET ");
        push_set(&mut qb, &patch);
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" ").push(RETURNING);
        let row = qb
            .build_query_as::<StudentEntry>()
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Applies the patch to every student row, returns the affected count.
    pub async fn update_all(&self, patch: PatchStudentInput) -> Result<u64> {
        let mut qb = QueryBuilder::new("UPDATE students SET ");
        push_set(&mut qb, &patch);
        let result = qb.build().execute(self.pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_one(
    conn: &mut PgConnection,
    student: CreateStudentInput,
) -> Result<StudentEntry> {
    let row = sqlx::query_as::<_, StudentEntry>(&format!(
        r#"
        INSERT INTO students (name, email, mobile_number, usn, course, sem, branch, role)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        {}
        "#,
        RETURNING
    ))
    .bind(student.name)
    .bind(student.email)
    .bind(student.mobile_number)
    .bind(student.usn)
    .bind(student.course)
    .bind(student.sem)
    .bind(student.branch)
    .bind(student.role.unwrap_or_else(|| "student".to_string()))
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

fn push_set(qb: &mut QueryBuilder<'_, Postgres>, patch: &PatchStudentInput) {
    let mut set = qb.separated(", ");
    if let Some(name) = &patch.name {
        set.push("name = ").push_bind_unseparated(name.clone());
    }
    if let Some(email) = &patch.email {
        set.push("email = ").push_bind_unseparated(email.clone());
    }
    if let Some(mobile) = &patch.mobile_number {
        set.push("mobile_number = ").push_bind_unseparated(mobile.clone());
    }
    if let Some(usn) = &patch.usn {
        set.push("usn = ").push_bind_unseparated(usn.clone());
    }
    if let Some(course) = &patch.course {
        set.push("course = ").push_bind_unseparated(course.clone());
    }
    if let Some(sem) = &patch.sem {
        set.push("sem = ").push_bind_unseparated(*sem);
    }
    if let Some(branch) = &patch.branch {
        set.push("branch = ").push_bind_unseparated(branch.clone());
    }
    if let Some(role) = &patch.role {
        set.push("role = ").push_bind_unseparated(role.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_builds_comma_separated_set() {
        let patch = PatchStudentInput {
            course: Some("MCA".into()),
            sem: Some(3),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("UPDATE students SET ");
        push_set(&mut qb, &patch);
        assert_eq!(qb.sql(), "UPDATE students SET course = $1, sem = $2");
    }
}
